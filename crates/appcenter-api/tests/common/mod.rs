//! Shared fixtures for the mock server tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use appcenter_api::{AppCenterClient, AppRef, ClientConfig};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "token";
pub const APP_PATH: &str = "/v0.1/apps/owner/app";

pub fn client(server: &MockServer) -> AppCenterClient {
    let config = ClientConfig::new(TOKEN)
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap();
    AppCenterClient::new(&config).unwrap()
}

pub fn app() -> AppRef {
    AppRef::new("owner", "app").unwrap()
}

pub fn app_path(tail: &str) -> String {
    format!("{}/{}", APP_PATH, tail)
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn release(id: u64, version: &str) -> Value {
    json!({
        "id": id,
        "version": version,
        "short_version": "1.0.0",
        "download_url": format!("https://download.example/{}/app.apk", id)
    })
}

pub fn app_record(name: &str, owner: &str) -> Value {
    json!({
        "name": name,
        "display_name": name,
        "os": "Android",
        "platform": "Java",
        "owner": { "name": owner, "display_name": owner, "type": "user" }
    })
}
