//! Owner and version resolution

use serde::Serialize;
use tracing::{debug, instrument};

use crate::api::AppCenterClient;
use crate::error::{AppCenterError, Result};
use crate::types::{App, AppIdentity, AppRef, Release};

/// Latest release of an app
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestVersion {
    pub app: AppRef,
    pub version: String,
    pub release: Release,
}

/// Pick the app matching `app_name` exactly, or the first app when no name is given.
///
/// Ties keep the server's order.
pub fn select_app<'a>(apps: &'a [App], app_name: Option<&str>) -> Option<&'a App> {
    match app_name {
        Some(name) => apps.iter().find(|app| app.name == name),
        None => apps.first(),
    }
}

/// Release with the highest id
pub fn latest_release(releases: &[Release]) -> Option<&Release> {
    releases.iter().max_by_key(|release| release.id)
}

/// Resolve against an app list the caller already holds
pub fn resolve_identity(identity: &AppIdentity, apps: &[App]) -> Result<AppRef> {
    let not_found = || {
        AppCenterError::AppNotFound(format!(
            "{} for owner {}",
            identity.app_name.as_deref().unwrap_or("<any>"),
            identity.owner_name.as_deref().unwrap_or("<unknown>")
        ))
    };

    let selected = match &identity.owner_name {
        Some(owner) => apps
            .iter()
            .filter(|app| app.owner_name() == Some(owner.as_str()))
            .find(|app| identity.app_name.as_deref().map_or(true, |n| app.name == n)),
        None => select_app(apps, identity.app_name.as_deref()),
    }
    .ok_or_else(not_found)?;

    let owner = selected.owner_name().ok_or_else(not_found)?;
    AppRef::new(owner, selected.name.clone())
}

impl AppCenterClient {
    /// Owner of the first app named `app_name`
    #[instrument(skip(self))]
    pub async fn resolve_owner(&self, app_name: &str) -> Result<Option<String>> {
        let apps = self.list_apps().await?;
        let owner = select_app(&apps, Some(app_name))
            .and_then(|app| app.owner_name())
            .map(str::to_string);
        debug!(owner = ?owner, "resolved owner");
        Ok(owner)
    }

    /// Turn partial coordinates into resolved ones
    ///
    /// Lists the apps only when the owner or the app name is missing.
    pub async fn resolve_app(&self, identity: &AppIdentity) -> Result<AppRef> {
        if let Some(app) = identity.as_resolved() {
            return Ok(app);
        }

        let apps = self.list_apps().await?;
        resolve_identity(identity, &apps)
    }

    /// Latest version of an app, resolving the owner when missing
    #[instrument(skip(self))]
    pub async fn fetch_latest_version(&self, identity: &AppIdentity) -> Result<LatestVersion> {
        let app = self.resolve_app(identity).await?;

        let releases = match self.list_releases(&app).await {
            Ok(releases) => releases,
            Err(AppCenterError::NotFound(_)) => {
                return Err(AppCenterError::NoVersions(format!(
                    "'{}' owned by {}",
                    app.app_name, app.owner_name
                )))
            }
            Err(e) => return Err(e),
        };

        let release = latest_release(&releases)
            .cloned()
            .ok_or_else(|| AppCenterError::NoVersions("The app has no versions yet".to_string()))?;

        Ok(LatestVersion {
            app,
            version: release.version.clone(),
            release,
        })
    }
}
