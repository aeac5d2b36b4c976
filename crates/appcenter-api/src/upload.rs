//! Upload-commit workflow
//!
//! `create session -> transfer bytes -> commit | abort`. Except for a 401
//! during the transfer, every session created here is driven to a terminal
//! status before the call returns.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, error, info, instrument, warn};

use crate::api::AppCenterClient;
use crate::artifact::zip_bundle;
use crate::error::{AppCenterError, Result};
use crate::http::ConnectionMode;
use crate::types::{
    AppRef, ReleaseUploadRequest, ReleaseUploadUpdate, SymbolType, SymbolUploadRequest,
    UploadSession, UploadStatus,
};

/// Form field carrying the binary; used for every artifact type
const BINARY_FIELD: &str = "ipa";

/// Form field carrying the session id
const UPLOAD_ID_FIELD: &str = "upload_id";

/// Blob type header required by the symbol storage
const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const BLOB_TYPE: &str = "BlockBlob";

/// Result of sending bytes to an upload URL
#[derive(Debug)]
enum Transfer {
    Succeeded,
    Unauthorized,
    Failed { status: u16, message: String },
}

impl AppCenterClient {
    /// Create a release upload, transfer the binary and commit it
    pub async fn upload_release(
        &self,
        app: &AppRef,
        file: &Path,
        body: Option<&ReleaseUploadRequest>,
        timeout: Duration,
    ) -> Result<ReleaseUploadUpdate> {
        let session = self.create_release_upload(app, body).await?;
        self.upload_build(app, file, &session, timeout).await
    }

    /// Create a dSYM upload, transfer the bundle and commit it
    pub async fn upload_dsym(&self, app: &AppRef, file: &Path, timeout: Duration) -> Result<()> {
        let session = self.create_dsym_upload(app).await?;
        self.upload_symbol(app, file, SymbolType::Apple, &session, timeout)
            .await
    }

    /// Create a mapping upload, transfer the file and commit it
    pub async fn upload_mapping(
        &self,
        app: &AppRef,
        file: &Path,
        build_number: &str,
        version: &str,
        timeout: Duration,
    ) -> Result<()> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("mapping.txt");
        let request = SymbolUploadRequest::android_mapping(file_name, build_number, version);
        let session = self.create_symbol_upload(app, &request).await?;
        self.upload_symbol(app, file, SymbolType::AndroidProguard, &session, timeout)
            .await
    }

    /// Transfer a binary to a release upload session, then commit or abort it
    #[instrument(skip(self, app, session), fields(app = %app, upload_id = %session.id))]
    pub async fn upload_build(
        &self,
        app: &AppRef,
        file: &Path,
        session: &UploadSession,
        timeout: Duration,
    ) -> Result<ReleaseUploadUpdate> {
        match self.transfer_binary(file, session, timeout).await {
            Transfer::Succeeded => {
                info!("Binary uploaded");
                self.update_release_upload(app, &session.id, UploadStatus::Committed)
                    .await
            }
            Transfer::Unauthorized => {
                error!("Auth Error, provided invalid token");
                Err(AppCenterError::Unauthorized)
            }
            Transfer::Failed { status, message } => {
                error!("Error uploading binary {}: {}", status, message);
                settle_abort(
                    self.update_release_upload(app, &session.id, UploadStatus::Aborted)
                        .await
                        .map(|_| ()),
                )?;
                error!("Release aborted");
                Err(AppCenterError::UploadFailed {
                    artifact: "binary".to_string(),
                    status,
                    message,
                })
            }
        }
    }

    /// Transfer a symbol file to a symbol upload session, then commit or abort it
    #[instrument(skip(self, app, session), fields(app = %app, symbol_upload_id = %session.id))]
    pub async fn upload_symbol(
        &self,
        app: &AppRef,
        file: &Path,
        symbol_type: SymbolType,
        session: &UploadSession,
        timeout: Duration,
    ) -> Result<()> {
        let label = symbol_type.label();

        match self.transfer_symbol(file, session, timeout).await {
            Transfer::Succeeded => {
                self.update_symbol_upload(app, &session.id, UploadStatus::Committed)
                    .await?;
                info!("{} uploaded", label);
                Ok(())
            }
            Transfer::Unauthorized => {
                error!("Auth Error, provided invalid token");
                Err(AppCenterError::Unauthorized)
            }
            Transfer::Failed { status, message } => {
                error!("Error uploading {} {}: {}", label, status, message);
                settle_abort(
                    self.update_symbol_upload(app, &session.id, UploadStatus::Aborted)
                        .await
                        .map(|_| ()),
                )?;
                error!("{} upload aborted", label);
                Err(AppCenterError::UploadFailed {
                    artifact: label.to_string(),
                    status,
                    message,
                })
            }
        }
    }

    async fn transfer_binary(&self, file: &Path, session: &UploadSession, timeout: Duration) -> Transfer {
        let content = match tokio::fs::read(file).await {
            Ok(content) => content,
            Err(e) => return Transfer::read_failed(file, e),
        };

        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string();

        let part = match Part::bytes(content)
            .file_name(file_name)
            .mime_str("application/octet-stream")
        {
            Ok(part) => part,
            Err(e) => return Transfer::transport_failed(e),
        };

        let form = Form::new()
            .text(UPLOAD_ID_FIELD, session.id.clone())
            .part(BINARY_FIELD, part);

        let request = match self.http().transfer(
            Method::POST,
            &session.upload_url,
            ConnectionMode::Multipart,
            timeout,
        ) {
            Ok(request) => request.multipart(form),
            Err(e) => {
                return Transfer::Failed {
                    status: 0,
                    message: e.to_string(),
                }
            }
        };

        self.send_transfer(request).await
    }

    async fn transfer_symbol(&self, file: &Path, session: &UploadSession, timeout: Duration) -> Transfer {
        let content = match read_symbol(file).await {
            Ok(content) => content,
            Err(transfer) => return transfer,
        };

        let request = match self.http().transfer(
            Method::PUT,
            &session.upload_url,
            ConnectionMode::RawUpload,
            timeout,
        ) {
            Ok(request) => request.header(BLOB_TYPE_HEADER, BLOB_TYPE).body(content),
            Err(e) => {
                return Transfer::Failed {
                    status: 0,
                    message: e.to_string(),
                }
            }
        };

        self.send_transfer(request).await
    }

    async fn send_transfer(&self, request: reqwest::RequestBuilder) -> Transfer {
        match self.http().send(request).await {
            Ok(response) => match response.status.as_u16() {
                200..=299 => Transfer::Succeeded,
                401 => Transfer::Unauthorized,
                status => Transfer::Failed {
                    status,
                    message: response.text(),
                },
            },
            Err(AppCenterError::Http(e)) => Transfer::transport_failed(e),
            Err(e) => Transfer::Failed {
                status: 0,
                message: e.to_string(),
            },
        }
    }
}

/// Symbol file bytes; bundle directories are zipped first
async fn read_symbol(file: &Path) -> std::result::Result<Vec<u8>, Transfer> {
    if !file.is_dir() {
        return tokio::fs::read(file)
            .await
            .map_err(|e| Transfer::read_failed(file, e));
    }

    debug!(bundle = %file.display(), "zipping symbol bundle");
    let dir = file.to_path_buf();
    match tokio::task::spawn_blocking(move || zip_bundle(&dir)).await {
        Ok(Ok(content)) => Ok(content),
        Ok(Err(e)) => Err(Transfer::Failed {
            status: 0,
            message: e.to_string(),
        }),
        Err(e) => Err(Transfer::Failed {
            status: 0,
            message: format!("failed to zip {}: {}", file.display(), e),
        }),
    }
}

/// Fatal abort failures propagate; recoverable ones are only logged.
fn settle_abort(outcome: Result<()>) -> Result<()> {
    match outcome {
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(error = %e, "failed to abort upload session");
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

impl Transfer {
    fn read_failed(file: &Path, e: std::io::Error) -> Self {
        Transfer::Failed {
            status: 0,
            message: format!("failed to read {}: {}", file.display(), e),
        }
    }

    /// Timeouts and connection errors count as a failed transfer
    fn transport_failed(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("timed out: {}", e)
        } else {
            e.to_string()
        };
        Transfer::Failed {
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            message,
        }
    }
}
