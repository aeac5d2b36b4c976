//! Upload-commit workflow: every session ends committed or aborted

mod common;

use std::time::Duration;

use appcenter_api::http::TOKEN_HEADER;
use appcenter_api::{AppCenterError, ErrorClass, SymbolType, UploadSession};
use common::{app, app_path, client, write_file};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn session(server: &MockServer, id: &str, upload_path: &str) -> UploadSession {
    UploadSession {
        id: id.to_string(),
        upload_url: format!("{}{}", server.uri(), upload_path),
        expiration_date: None,
    }
}

async fn mount_release_update(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("PATCH"))
        .and(path(app_path("release_uploads/upload_id")))
        .and(body_json(json!({ "status": status })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "release_id": "1",
            "release_url": "v0.1/apps/owner/app/releases/1"
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_symbol_update(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("PATCH"))
        .and(path(app_path("symbol_uploads/symbol_upload_id")))
        .and(body_json(json!({ "status": status })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_transfer_commits_once() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"upload_id\""))
        .and(body_string_contains("name=\"ipa\""))
        .and(|request: &Request| !request.headers.contains_key(TOKEN_HEADER))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_release_update(&server, "committed", 1).await;
    mount_release_update(&server, "aborted", 0).await;

    let update = client(&server)
        .upload_build(&app(), &apk, &session(&server, "upload_id", "/upload"), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(update.release_id, Some(1));
}

#[tokio::test]
async fn test_failed_transfer_aborts_once() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .expect(1)
        .mount(&server)
        .await;
    mount_release_update(&server, "committed", 0).await;
    mount_release_update(&server, "aborted", 1).await;

    let err = client(&server)
        .upload_build(&app(), &apk, &session(&server, "upload_id", "/upload"), TIMEOUT)
        .await
        .unwrap_err();
    match err {
        AppCenterError::UploadFailed {
            artifact, status, ..
        } => {
            assert_eq!(artifact, "binary");
            assert_eq!(status, 500);
        }
        other => panic!("expected UploadFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_transfer_skips_update() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_release_update(&server, "committed", 0).await;
    mount_release_update(&server, "aborted", 0).await;

    let err = client(&server)
        .upload_build(&app(), &apk, &session(&server, "upload_id", "/upload"), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, AppCenterError::Unauthorized));
    assert_eq!(err.class(), ErrorClass::FatalUser);
}

#[tokio::test]
async fn test_transfer_timeout_aborts() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    mount_release_update(&server, "committed", 0).await;
    mount_release_update(&server, "aborted", 1).await;

    let err = client(&server)
        .upload_build(
            &app(),
            &apk,
            &session(&server, "upload_id", "/upload"),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppCenterError::UploadFailed { .. }));
}

#[tokio::test]
async fn test_abort_failure_keeps_transfer_error() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad chunk"))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(app_path("release_uploads/upload_id")))
        .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_build(&app(), &apk, &session(&server, "upload_id", "/upload"), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, AppCenterError::UploadFailed { status: 400, .. }));
}

#[tokio::test]
async fn test_abort_server_error_is_fatal() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let apk = write_file(temp.path(), "app.apk", b"apk bytes");

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(app_path("release_uploads/upload_id")))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_build(&app(), &apk, &session(&server, "upload_id", "/upload"), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::FatalService);
}

#[tokio::test]
async fn test_missing_file_aborts() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_release_update(&server, "aborted", 1).await;

    let err = client(&server)
        .upload_build(
            &app(),
            &temp.path().join("gone.apk"),
            &session(&server, "upload_id", "/upload"),
            TIMEOUT,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppCenterError::UploadFailed { status: 0, .. }));
}

#[tokio::test]
async fn test_symbol_transfer_commits() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let dsym = write_file(temp.path(), "App.dSYM.zip", b"dsym bytes");

    Mock::given(method("PUT"))
        .and(path("/upload_dsym"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    mount_symbol_update(&server, "committed", 1).await;
    mount_symbol_update(&server, "aborted", 0).await;

    client(&server)
        .upload_symbol(
            &app(),
            &dsym,
            SymbolType::Apple,
            &session(&server, "symbol_upload_id", "/upload_dsym"),
            TIMEOUT,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_symbol_transfer_failure_aborts() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let mapping = write_file(temp.path(), "mapping.txt", b"a -> b");

    Mock::given(method("PUT"))
        .and(path("/upload_mapping"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    mount_symbol_update(&server, "committed", 0).await;
    mount_symbol_update(&server, "aborted", 1).await;

    let err = client(&server)
        .upload_symbol(
            &app(),
            &mapping,
            SymbolType::AndroidProguard,
            &session(&server, "symbol_upload_id", "/upload_mapping"),
            TIMEOUT,
        )
        .await
        .unwrap_err();
    match err {
        AppCenterError::UploadFailed {
            artifact, status, ..
        } => {
            assert_eq!(artifact, "mapping");
            assert_eq!(status, 403);
        }
        other => panic!("expected UploadFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_symbol_unauthorized_skips_update() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let dsym = write_file(temp.path(), "App.dSYM.zip", b"dsym bytes");

    Mock::given(method("PUT"))
        .and(path("/upload_dsym"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_symbol_update(&server, "committed", 0).await;
    mount_symbol_update(&server, "aborted", 0).await;

    let err = client(&server)
        .upload_symbol(
            &app(),
            &dsym,
            SymbolType::Apple,
            &session(&server, "symbol_upload_id", "/upload_dsym"),
            TIMEOUT,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppCenterError::Unauthorized));
}

#[tokio::test]
async fn test_upload_release_end_to_end() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let ipa = write_file(temp.path(), "App.ipa", b"ipa bytes");

    Mock::given(method("POST"))
        .and(path(app_path("release_uploads")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "upload_id": "upload_id",
            "upload_url": format!("{}/upload", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_release_update(&server, "committed", 1).await;

    let update = client(&server)
        .upload_release(&app(), &ipa, None, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(update.release_id, Some(1));
}
