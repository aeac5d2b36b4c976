//! Apps, distribution groups and devices

use reqwest::Method;
use tracing::{debug, info, instrument};

use super::{AppCenterClient, StatusPolicy};
use crate::error::{AppCenterError, Result};
use crate::http::ConnectionMode;
use crate::types::{App, AppRef, DeviceList, DistributionGroup, NewApp, OwnerType};

impl AppCenterClient {
    /// Check whether an app exists
    ///
    /// 404 yields `Ok(false)`; any other failure is an error, never a default.
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn app_exists(&self, app: &AppRef) -> Result<bool> {
        let request = self.app_request(Method::GET, app, &[], ConnectionMode::Plain)?;
        let response = self.http().send(request).await?;

        if response.status.as_u16() == 404 {
            if self.http().debug() {
                debug!("DEBUG: {}", response.pretty());
            }
            return Ok(false);
        }

        let policy = StatusPolicy::new(format!("Error getting app {},", app));
        self.classify(response, &policy)?;
        Ok(true)
    }

    /// Create an app under a user or an organization
    #[instrument(skip(self, app), fields(app = %app.name))]
    pub async fn create_app(
        &self,
        owner_type: OwnerType,
        owner_name: &str,
        app: &NewApp,
    ) -> Result<App> {
        let tail: Vec<&str> = match owner_type {
            OwnerType::User => vec!["apps"],
            OwnerType::Organization => vec!["orgs", owner_name, "apps"],
        };
        let request = self.root_request(Method::POST, &tail)?.json(app);

        let created: App = self
            .execute(request, &StatusPolicy::new("Error creating app"))
            .await?
            .json()?;

        info!(
            "Created {}/{} app with name \"{}\" and display name \"{}\" for {} \"{}\"",
            app.os,
            app.platform,
            created.name,
            created.display_name.as_deref().unwrap_or(&app.display_name),
            owner_type,
            owner_name
        );
        Ok(created)
    }

    /// List every app visible to the token
    #[instrument(skip(self))]
    pub async fn list_apps(&self) -> Result<Vec<App>> {
        let request = self.root_request(Method::GET, &["apps"])?;
        let apps: Option<Vec<App>> = self
            .execute(request, &StatusPolicy::new("Error listing apps"))
            .await?
            .json()?;
        Ok(apps.unwrap_or_default())
    }

    /// List distribution groups of an app
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn list_distribution_groups(&self, app: &AppRef) -> Result<Vec<DistributionGroup>> {
        let request =
            self.app_request(Method::GET, app, &["distribution_groups"], ConnectionMode::Plain)?;

        let policy = StatusPolicy::new("Error").not_found("invalid owner or application name");
        let groups: Option<Vec<DistributionGroup>> =
            self.execute(request, &policy).await?.json()?;
        Ok(groups.unwrap_or_default())
    }

    /// Download the device list of a distribution group as CSV
    #[instrument(skip(self, app), fields(app = %app))]
    pub async fn fetch_devices(&self, app: &AppRef, distribution_group: &str) -> Result<DeviceList> {
        if distribution_group.trim().is_empty() {
            return Err(AppCenterError::InvalidConfig {
                field: "distribution_group".to_string(),
                message: "No distribution group given".to_string(),
            });
        }

        let request = self.app_request(
            Method::GET,
            app,
            &[
                "distribution_groups",
                distribution_group,
                "devices",
                "download_devices_list",
            ],
            ConnectionMode::Csv,
        )?;

        let policy = StatusPolicy::new("Error")
            .not_found("invalid owner, application or distribution group name");
        let response = self.execute(request, &policy).await?;
        Ok(DeviceList::new(response.body))
    }
}
