//! Release and symbol upload sessions

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{AppCenterClient, StatusPolicy};
use crate::error::Result;
use crate::http::ConnectionMode;
use crate::types::{
    AppRef, ReleaseUploadRequest, ReleaseUploadUpdate, SymbolUploadRequest, UploadSession,
    UploadStatus,
};

impl AppCenterClient {
    /// Create a release upload session
    #[instrument(skip(self, app, body), fields(app = %app))]
    pub async fn create_release_upload(
        &self,
        app: &AppRef,
        body: Option<&ReleaseUploadRequest>,
    ) -> Result<UploadSession> {
        let default_body = ReleaseUploadRequest::default();
        let request = self
            .app_request(Method::POST, app, &["release_uploads"], ConnectionMode::Plain)?
            .json(body.unwrap_or(&default_body));

        let policy = StatusPolicy::new("Error")
            .not_found("invalid owner or application name")
            .fatal_server_errors();
        let session: UploadSession = self.execute(request, &policy).await?.json()?;
        debug!(upload_id = %session.id, "release upload created");
        Ok(session)
    }

    /// Create a symbol upload session for a dSYM bundle
    pub async fn create_dsym_upload(&self, app: &AppRef) -> Result<UploadSession> {
        self.create_symbol_upload(app, &SymbolUploadRequest::apple())
            .await
    }

    /// Create a symbol upload session for an Android Proguard mapping file
    pub async fn create_mapping_upload(
        &self,
        app: &AppRef,
        file_name: &str,
        build_number: &str,
        version: &str,
    ) -> Result<UploadSession> {
        let request = SymbolUploadRequest::android_mapping(file_name, build_number, version);
        self.create_symbol_upload(app, &request).await
    }

    /// Create a symbol upload session
    #[instrument(skip(self, app, body), fields(app = %app, symbol_type = ?body.symbol_type))]
    pub async fn create_symbol_upload(
        &self,
        app: &AppRef,
        body: &SymbolUploadRequest,
    ) -> Result<UploadSession> {
        let request = self
            .app_request(Method::POST, app, &["symbol_uploads"], ConnectionMode::Plain)?
            .json(body);

        let policy = StatusPolicy::new("Error").not_found("invalid owner or application name");
        let session: UploadSession = self.execute(request, &policy).await?.json()?;
        debug!(symbol_upload_id = %session.id, "symbol upload created");
        Ok(session)
    }

    /// Commit or abort a symbol upload
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn update_symbol_upload(
        &self,
        app: &AppRef,
        symbol_upload_id: &str,
        status: UploadStatus,
    ) -> Result<Value> {
        let request = self
            .app_request(
                Method::PATCH,
                app,
                &["symbol_uploads", symbol_upload_id],
                ConnectionMode::Plain,
            )?
            .json(&json!({ "status": status }));

        self.execute(request, &StatusPolicy::new("Error"))
            .await?
            .json()
    }

    /// Commit or abort a release upload
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn update_release_upload(
        &self,
        app: &AppRef,
        upload_id: &str,
        status: UploadStatus,
    ) -> Result<ReleaseUploadUpdate> {
        let request = self
            .app_request(
                Method::PATCH,
                app,
                &["release_uploads", upload_id],
                ConnectionMode::Plain,
            )?
            .json(&json!({ "status": status }));

        let policy = StatusPolicy::new("Error").fatal_server_errors();
        let response = self.execute(request, &policy).await?;
        Ok(response.json::<Option<ReleaseUploadUpdate>>()?.unwrap_or_default())
    }
}
