//! Configuration types

use std::time::Duration;

use appcenter_api::{AppIdentity, DestinationType, DistributeOptions, NewApp, OwnerType};
use serde::{Deserialize, Serialize};

use super::defaults::default_timeout;

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Owner of the app (user or organization name)
    pub owner_name: Option<String>,

    /// Whether the owner is a user or an organization
    pub owner_type: OwnerType,

    /// App name as used in API paths
    pub app_name: Option<String>,

    /// API root override
    pub api_url: Option<String>,

    /// Transfer timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Distribution settings
    pub distribution: DistributionConfig,

    /// Settings for creating the app when it does not exist
    pub app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner_name: None,
            owner_type: OwnerType::default(),
            app_name: None,
            api_url: None,
            timeout: default_timeout(),
            distribution: DistributionConfig::default(),
            app: AppConfig::default(),
        }
    }
}

/// Where releases go after upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Group or store names
    pub destinations: Vec<String>,

    /// Whether destinations are groups or stores
    pub destination_type: DestinationType,

    /// Force testers to update
    pub mandatory_update: bool,

    /// Email testers about the release
    pub notify_testers: bool,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            destination_type: DestinationType::Group,
            mandatory_update: false,
            notify_testers: false,
        }
    }
}

/// App creation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display_name: Option<String>,
    pub os: Option<String>,
    pub platform: Option<String>,
}

/// Values given on the command line or through the environment
///
/// `Some` always wins over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub owner_name: Option<String>,
    pub owner_type: Option<OwnerType>,
    pub app_name: Option<String>,
    pub api_url: Option<String>,
    pub timeout: Option<u64>,
    pub destinations: Option<Vec<String>>,
    pub destination_type: Option<DestinationType>,
    pub mandatory_update: Option<bool>,
    pub notify_testers: Option<bool>,
    pub display_name: Option<String>,
    pub os: Option<String>,
    pub platform: Option<String>,
}

impl Config {
    /// Merge overrides into the file values
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        fn set_some<T>(target: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *target = value;
            }
        }

        set_some(&mut self.owner_name, overrides.owner_name);
        set(&mut self.owner_type, overrides.owner_type);
        set_some(&mut self.app_name, overrides.app_name);
        set_some(&mut self.api_url, overrides.api_url);
        set(&mut self.timeout, overrides.timeout);

        set(&mut self.distribution.destinations, overrides.destinations);
        set(&mut self.distribution.destination_type, overrides.destination_type);
        set(&mut self.distribution.mandatory_update, overrides.mandatory_update);
        set(&mut self.distribution.notify_testers, overrides.notify_testers);

        set_some(&mut self.app.display_name, overrides.display_name);
        set_some(&mut self.app.os, overrides.os);
        set_some(&mut self.app.platform, overrides.platform);
    }

    /// Owner and app name, possibly incomplete
    pub fn identity(&self) -> AppIdentity {
        AppIdentity::new(self.owner_name.clone(), self.app_name.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn distribute_options(&self) -> DistributeOptions {
        DistributeOptions {
            destinations: self.distribution.destinations.clone(),
            destination_type: self.distribution.destination_type,
            mandatory_update: self.distribution.mandatory_update,
            notify_testers: self.distribution.notify_testers,
        }
    }

    /// App to create when missing; `None` unless both `os` and `platform` are set
    pub fn new_app(&self) -> Option<NewApp> {
        let app_name = self.app_name.clone()?;
        let os = self.app.os.clone()?;
        let platform = self.app.platform.clone()?;

        Some(NewApp {
            display_name: self.app.display_name.clone().unwrap_or_else(|| app_name.clone()),
            name: app_name,
            os,
            platform,
        })
    }
}
