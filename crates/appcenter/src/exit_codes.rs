//! Exit codes for the CLI

use appcenter_api::{AppCenterError, ErrorClass};
use appcenter_core::ConfigError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Invalid or missing API token
pub const AUTH_ERROR: i32 = 3;

/// Server-side failure, try again later
pub const SERVICE_ERROR: i32 = 4;

/// Release uploaded but not every destination received it
pub const PARTIAL_DISTRIBUTION: i32 = 5;

/// Marker error for a run that uploaded but failed some destinations
#[derive(Debug)]
pub struct PartialDistribution {
    pub failed: usize,
    pub total: usize,
}

impl std::fmt::Display for PartialDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Release could not be distributed to {} of {} destinations",
            self.failed, self.total
        )
    }
}

impl std::error::Error for PartialDistribution {}

/// Map an error to the process exit code
pub fn for_error(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }
    if error.downcast_ref::<PartialDistribution>().is_some() {
        return PARTIAL_DISTRIBUTION;
    }

    match error.downcast_ref::<AppCenterError>() {
        Some(AppCenterError::Unauthorized) => AUTH_ERROR,
        Some(AppCenterError::InvalidConfig { .. }) => CONFIG_ERROR,
        Some(e) if e.class() == ErrorClass::FatalService => SERVICE_ERROR,
        _ => ERROR,
    }
}
