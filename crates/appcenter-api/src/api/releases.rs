//! Releases and distribution destinations

use reqwest::Method;
use serde_json::json;
use tracing::{info, instrument};

use super::{AppCenterClient, StatusPolicy};
use crate::error::Result;
use crate::http::ConnectionMode;
use crate::types::{
    AppRef, Destination, DestinationAssignment, DestinationType, DistributedRelease, Release,
};

impl AppCenterClient {
    /// Fetch a release by id
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn get_release(&self, app: &AppRef, release_id: u64) -> Result<Release> {
        let id = release_id.to_string();
        let request = self.app_request(Method::GET, app, &["releases", id.as_str()], ConnectionMode::Plain)?;

        let policy = StatusPolicy::new("Error fetching information about release")
            .not_found("invalid release url");
        self.execute(request, &policy).await?.json()
    }

    /// List all releases of an app
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn list_releases(&self, app: &AppRef) -> Result<Vec<Release>> {
        let request = self.app_request(Method::GET, app, &["releases"], ConnectionMode::Plain)?;

        let policy = StatusPolicy::new("Error fetching releases")
            .not_found("invalid owner or application name");
        Ok(self
            .execute(request, &policy)
            .await?
            .json::<Option<Vec<Release>>>()?
            .unwrap_or_default())
    }

    /// Fetch a distribution group or store by name
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn get_destination(
        &self,
        app: &AppRef,
        destination_type: DestinationType,
        name: &str,
    ) -> Result<Destination> {
        let collection = format!("distribution_{}s", destination_type);
        let request = self.app_request(
            Method::GET,
            app,
            &[collection.as_str(), name],
            ConnectionMode::Plain,
        )?;

        let policy = StatusPolicy::new(format!("Error getting {}", destination_type))
            .not_found(format!("invalid distribution {} name", destination_type));
        self.execute(request, &policy).await?.json()
    }

    /// Replace the release notes, then read the release back
    #[instrument(skip(self, app, release_notes), fields(app = %app))]
    pub async fn update_release_notes(
        &self,
        app: &AppRef,
        release_id: u64,
        release_notes: &str,
    ) -> Result<DistributedRelease> {
        let id = release_id.to_string();
        let request = self
            .app_request(Method::PUT, app, &["releases", id.as_str()], ConnectionMode::Plain)?
            .json(&json!({ "release_notes": release_notes }));

        let policy = StatusPolicy::new("Error updating release").not_found("invalid release id");
        self.execute(request, &policy).await?;

        let release = self.get_release(app, release_id).await?;
        info!(
            "Release '{}' ({}) was successfully updated",
            release_id, release.short_version
        );
        Ok(release.into())
    }

    /// Attach the DSA signature to the release metadata
    ///
    /// Returns `false` without any request when the signature is empty.
    #[instrument(skip(self, app, dsa_signature), fields(app = %app))]
    pub async fn update_release_metadata(
        &self,
        app: &AppRef,
        release_id: u64,
        dsa_signature: &str,
    ) -> Result<bool> {
        if dsa_signature.is_empty() {
            return Ok(false);
        }

        let id = release_id.to_string();
        let request = self
            .app_request(Method::PATCH, app, &["releases", id.as_str()], ConnectionMode::Plain)?
            .json(&json!({ "metadata": { "dsa_signature": dsa_signature } }));

        let policy =
            StatusPolicy::new("Error updating release metadata").not_found("invalid release id");
        self.execute(request, &policy).await?;

        info!("Release Metadata was successfully updated for release '{}'", release_id);
        Ok(true)
    }

    /// Attach a release to a group or store, then read the release back
    #[instrument(skip(self, app, assignment), fields(app = %app, destination = %assignment.destination_type))]
    pub async fn add_to_destination(
        &self,
        app: &AppRef,
        release_id: u64,
        assignment: &DestinationAssignment,
    ) -> Result<DistributedRelease> {
        let id = release_id.to_string();
        let collection = format!("{}s", assignment.destination_type);
        let request = self
            .app_request(
                Method::POST,
                app,
                &["releases", id.as_str(), collection.as_str()],
                ConnectionMode::Plain,
            )?
            .json(&assignment.body());

        let policy = StatusPolicy::new(format!("Error adding to {}", assignment.destination_type))
            .not_found(format!(
                "invalid distribution {} name",
                assignment.destination_type
            ));
        self.execute(request, &policy).await?;

        let release = self.get_release(app, release_id).await?;
        info!(
            "Release '{}' ({}) was successfully distributed",
            release_id, release.short_version
        );
        Ok(release.into())
    }
}
