//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - The `--config` flag or `RAILSPEC_CONFIG`

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputSettings,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Defaults for the convert command
    pub convert: ConvertSettings,

    /// Plugin preparation settings
    pub plugins: PluginSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Indent converted documents
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Representation written when `--to` is not given (xml, dict, wire)
    pub default_target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Namespaces treated as already installed
    pub preinstalled: Vec<String>,

    /// Shell command run per namespace; `{namespace}` is substituted
    pub install_command: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            pretty: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            default_target: "dict".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "YAML or JSON".to_string(),
                })
            }
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e))),
            None => Self::load(),
        }
    }

    /// Get default configuration file paths to check, in search order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".railspec.yaml"),
            PathBuf::from(".railspec.json"),
            PathBuf::from("railspec.yaml"),
            PathBuf::from("railspec.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let railspec_dir = config_dir.join("railspec");
            paths.push(railspec_dir.join("config.yaml"));
            paths.push(railspec_dir.join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".railspec.yaml"));
            paths.push(home_dir.join(".railspec.json"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "convert:\n  default_target: wire\nplugins:\n  preinstalled:\n    - acme-text"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.convert.default_target, "wire");
        assert_eq!(config.plugins.preinstalled, vec!["acme-text".to_string()]);
        assert_eq!(config.output, OutputSettings::default());
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_json_config() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"output": {{"color": false, "pretty": false}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.output.color);
        assert!(!config.output.pretty);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_explicit_file_errors() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/railspec.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let file = Builder::new().suffix(".toml").tempfile().unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_search_order_starts_in_working_directory() {
        let paths = Config::default_config_paths();
        assert_eq!(paths[0], PathBuf::from(".railspec.yaml"));
        assert_eq!(paths[3], PathBuf::from("railspec.json"));
    }
}
