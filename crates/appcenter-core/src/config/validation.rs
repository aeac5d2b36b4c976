//! Configuration validation

use tracing::debug;
use url::Url;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_identity(config)?;
    validate_api(config)?;
    validate_distribution(config)?;
    validate_app(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_identity(config: &Config) -> Result<()> {
    if config.owner_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ConfigError::invalid("owner_name", "owner name cannot be empty"));
    }
    if config.app_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ConfigError::invalid("app_name", "app name cannot be empty"));
    }
    Ok(())
}

fn validate_api(config: &Config) -> Result<()> {
    if let Some(api_url) = &config.api_url {
        let parsed = Url::parse(api_url)
            .map_err(|e| ConfigError::invalid("api_url", format!("'{}': {}", api_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid("api_url", "must be an http(s) URL"));
        }
    }

    if config.timeout == 0 {
        return Err(ConfigError::invalid("timeout", "must be greater than zero"));
    }
    Ok(())
}

fn validate_distribution(config: &Config) -> Result<()> {
    for (i, name) in config.distribution.destinations.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("distribution.destinations[{}]", i),
                "destination name cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_app(config: &Config) -> Result<()> {
    let app = &config.app;
    if app.os.is_some() != app.platform.is_some() {
        return Err(ConfigError::invalid(
            "app",
            "os and platform must be given together",
        ));
    }
    Ok(())
}
