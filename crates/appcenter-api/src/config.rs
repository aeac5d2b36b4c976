//! Client configuration

use std::env;

use url::Url;

use crate::error::{AppCenterError, Result};

/// Production API root
pub const DEFAULT_API_URL: &str = "https://api.appcenter.ms";

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "APPCENTER_API_TOKEN";

/// Environment variable overriding the API root
pub const API_URL_ENV: &str = "APPCENTER_UPLOAD_URL";

/// Environment variable enabling verbose response logging
pub const DEBUG_ENV: &str = "DEBUG";

/// Credential and endpoint settings shared by every request
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_token: String,
    base_url: Url,
    debug: bool,
}

impl ClientConfig {
    /// Create a configuration for the production API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(AppCenterError::invalid_config(
                "api_token",
                "No API token for App Center given",
            ));
        }

        Ok(Self {
            api_token,
            base_url: Url::parse(DEFAULT_API_URL)?,
            debug: false,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let token = env::var(TOKEN_ENV).map_err(|_| {
            AppCenterError::invalid_config("api_token", format!("{} not set", TOKEN_ENV))
        })?;

        let mut config = Self::new(token)?;
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_base_url(&url)?;
            }
        }
        config.debug = debug_from_env();
        Ok(config)
    }

    /// Override the API root
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;
        if parsed.cannot_be_a_base() {
            return Err(AppCenterError::invalid_config(
                "base_url",
                format!("'{}' cannot be used as an API root", url),
            ));
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Enable or disable response body logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// Whether `DEBUG` is set to anything but empty or `0`
pub fn debug_from_env() -> bool {
    env::var(DEBUG_ENV).is_ok_and(|v| !v.is_empty() && v != "0")
}
