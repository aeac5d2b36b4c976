//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "appcenter.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "appcenter.yaml";

/// Transfer timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 240;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".appcenter.toml",
        ".appcenter.yaml",
    ]
}

pub(crate) fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
