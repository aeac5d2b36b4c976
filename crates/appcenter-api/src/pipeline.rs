//! Release pipeline
//!
//! Runs the full distribution flow for one app, strictly in order:
//! symbols, binary, release notes, metadata, destinations.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::AppCenterClient;
use crate::artifact::ArtifactKind;
use crate::error::{AppCenterError, Result};
use crate::types::{
    AppRef, DestinationAssignment, DestinationType, DistributedRelease, NewApp, OwnerType,
    Release, ReleaseUploadRequest,
};
use crate::urls;

/// Transfer timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(240);

/// Release notes sent when none are given
pub const DEFAULT_RELEASE_NOTES: &str = "No changelog given";

/// Where a release is distributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributeOptions {
    /// Group or store names, in order
    pub destinations: Vec<String>,
    pub destination_type: DestinationType,
    pub mandatory_update: bool,
    pub notify_testers: bool,
}

impl DistributeOptions {
    /// Parse a comma separated destination list
    pub fn with_destinations(mut self, list: &str) -> Self {
        self.destinations = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

/// A destination the release could not be attached to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDestination {
    pub name: String,
    pub reason: String,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionReport {
    pub app: Option<AppRef>,
    /// Whether the app was created by this run
    pub created_app: bool,
    pub dsym_uploaded: bool,
    pub mapping_uploaded: bool,
    pub release: Option<Release>,
    pub download_url: Option<String>,
    pub release_url: Option<String>,
    pub install_url: Option<String>,
    pub metadata_updated: bool,
    pub distributed: Vec<String>,
    pub failed: Vec<FailedDestination>,
}

impl DistributionReport {
    /// Whether every requested destination received the release
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything needed to publish one release
#[derive(Debug, Clone)]
pub struct ReleasePipeline {
    pub app: AppRef,
    pub owner_type: OwnerType,
    pub binary: Option<PathBuf>,
    pub dsym: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub build_version: Option<String>,
    pub build_number: Option<String>,
    pub release_notes: String,
    pub dsa_signature: String,
    pub distribute: DistributeOptions,
    /// App to create when the target does not exist
    pub create_app: Option<NewApp>,
    pub timeout: Duration,
}

impl ReleasePipeline {
    pub fn new(app: AppRef) -> Self {
        Self {
            app,
            owner_type: OwnerType::User,
            binary: None,
            dsym: None,
            mapping: None,
            build_version: None,
            build_number: None,
            release_notes: DEFAULT_RELEASE_NOTES.to_string(),
            dsa_signature: String::new(),
            distribute: DistributeOptions::default(),
            create_app: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Check artifacts and settings before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.binary.is_none() && self.dsym.is_none() && self.mapping.is_none() {
            return Err(AppCenterError::InvalidArtifact(
                "Nothing to upload, give a binary, a dSYM or a mapping file".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(AppCenterError::invalid_config(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        if let Some(path) = &self.binary {
            ArtifactKind::expect(path, ArtifactKind::Binary)?;
        }
        if let Some(path) = &self.dsym {
            ArtifactKind::expect(path, ArtifactKind::Dsym)?;
        }
        if let Some(path) = &self.mapping {
            ArtifactKind::expect(path, ArtifactKind::Mapping)?;
            if self.build_number.is_none() || self.build_version.is_none() {
                return Err(AppCenterError::invalid_config(
                    "build_number",
                    "Mapping uploads need both a build number and a version",
                ));
            }
        }
        if self.binary.is_none() && !self.distribute.destinations.is_empty() {
            warn!("No binary given, destinations will be ignored");
        }
        Ok(())
    }

    /// Run every step against the API
    ///
    /// Destination failures are collected in the report; any other error
    /// ends the run.
    #[instrument(skip(self, client), fields(app = %self.app))]
    pub async fn run(&self, client: &AppCenterClient) -> Result<DistributionReport> {
        self.validate()?;

        let mut report = DistributionReport {
            app: Some(self.app.clone()),
            ..Default::default()
        };
        report.created_app = self.ensure_app(client).await?;

        if let Some(dsym) = &self.dsym {
            client.upload_dsym(&self.app, dsym, self.timeout).await?;
            report.dsym_uploaded = true;
        }

        if let Some(mapping) = &self.mapping {
            client
                .upload_mapping(
                    &self.app,
                    mapping,
                    self.build_number.as_deref().unwrap_or_default(),
                    self.build_version.as_deref().unwrap_or_default(),
                    self.timeout,
                )
                .await?;
            report.mapping_uploaded = true;
        }

        let Some(binary) = &self.binary else {
            return Ok(report);
        };

        let body = ReleaseUploadRequest {
            build_version: self.build_version.clone(),
            build_number: self.build_number.clone(),
        };
        let committed = client
            .upload_release(&self.app, binary, Some(&body), self.timeout)
            .await?;
        let release_id = committed.release_id.ok_or_else(|| AppCenterError::Status {
            status: 200,
            message: "Commit response carries no release id".to_string(),
        })?;

        let updated = client
            .update_release_notes(&self.app, release_id, &self.release_notes)
            .await?;
        report.download_url = updated.download_url;
        report.release = Some(updated.release);
        report.release_url = Some(urls::release_url(
            self.owner_type,
            &self.app.owner_name,
            &self.app.app_name,
            release_id,
        ));
        report.install_url = Some(urls::install_url(
            self.owner_type,
            &self.app.owner_name,
            &self.app.app_name,
        ));

        report.metadata_updated = client
            .update_release_metadata(&self.app, release_id, &self.dsa_signature)
            .await?;

        for name in &self.distribute.destinations {
            match self.distribute_to(client, release_id, name).await {
                Ok(release) => {
                    if release.download_url.is_some() {
                        report.download_url = release.download_url;
                    }
                    report.release = Some(release.release);
                    report.distributed.push(name.clone());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(destination = %name, error = %e, "distribution failed");
                    report.failed.push(FailedDestination {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            distributed = report.distributed.len(),
            failed = report.failed.len(),
            "release pipeline finished"
        );
        Ok(report)
    }

    /// Returns whether the app had to be created
    async fn ensure_app(&self, client: &AppCenterClient) -> Result<bool> {
        if client.app_exists(&self.app).await? {
            return Ok(false);
        }

        let Some(new_app) = &self.create_app else {
            return Err(AppCenterError::AppNotFound(self.app.to_string()));
        };

        client
            .create_app(self.owner_type, &self.app.owner_name, new_app)
            .await?;
        Ok(true)
    }

    async fn distribute_to(
        &self,
        client: &AppCenterClient,
        release_id: u64,
        name: &str,
    ) -> Result<DistributedRelease> {
        let destination_type = self.distribute.destination_type;
        let destination = client
            .get_destination(&self.app, destination_type, name)
            .await?;

        let assignment = DestinationAssignment {
            destination_type,
            destination_id: destination.id,
            mandatory_update: self.distribute.mandatory_update,
            notify_testers: self.distribute.notify_testers,
        };
        client
            .add_to_destination(&self.app, release_id, &assignment)
            .await
    }
}
