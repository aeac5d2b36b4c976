//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content)?
    } else if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `appcenter.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/appcenter.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration, falling back to defaults when no file exists
///
/// A file that exists but does not parse or validate is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(ConfigError::NotFound(_)) => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcenter_api::{DestinationType, OwnerType};
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(&config_path, "owner_name = \"owner\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_toml_over_yaml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("appcenter.toml");
        let yaml_path = temp.path().join("appcenter.yaml");
        std::fs::write(&toml_path, "owner_name = \"owner\"").unwrap();
        std::fs::write(&yaml_path, "owner_name: owner").unwrap();

        assert_eq!(find_config(temp.path()).unwrap(), toml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("appcenter.yaml");
        std::fs::write(&config_path, "app_name: app").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(".appcenter.toml");
        std::fs::write(&config_path, "app_name = \"app\"").unwrap();
        let nested = temp.path().join("android").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(
            &config_path,
            r#"
owner_name = "acme"
owner_type = "organization"
app_name = "app"
timeout = 600

[distribution]
destinations = ["Testers", "QA"]
notify_testers = true

[app]
os = "Android"
platform = "Java"
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.owner_name.as_deref(), Some("acme"));
        assert_eq!(config.owner_type, OwnerType::Organization);
        assert_eq!(config.timeout, 600);
        assert_eq!(config.distribution.destinations, vec!["Testers", "QA"]);
        assert!(config.distribution.notify_testers);
        assert_eq!(config.new_app().unwrap().platform, "Java");
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.yaml");
        std::fs::write(
            &config_path,
            "owner_name: owner\napp_name: app\ndistribution:\n  destination_type: store\n  destinations:\n    - Production\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.timeout, 240);
        assert_eq!(config.distribution.destination_type, DestinationType::Store);
        assert_eq!(config.distribution.destinations, vec!["Production"]);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("appcenter.toml");
        std::fs::write(&config_path, "timeout = 0").unwrap();
        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));

        std::fs::write(&config_path, "owner_type = \"team\"").unwrap();
        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_load_config_or_default() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config, Config::default());

        std::fs::write(temp.path().join("appcenter.toml"), "timeout = \"soon\"").unwrap();
        assert!(load_config_or_default(temp.path()).is_err());
    }
}
