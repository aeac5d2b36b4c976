//! App Center Core - project configuration for the App Center release tool
//!
//! Finds, parses and validates the project file (`appcenter.toml` or
//! `appcenter.yaml`) and merges command line overrides into it.

pub mod config;
pub mod error;

pub use config::{
    find_config, load_config, load_config_from_dir, load_config_or_default, AppConfig, Config,
    ConfigOverrides, DistributionConfig,
};
pub use error::{ConfigError, Result};
