//! Skyorbs host configuration
//!
//! Settings for the native host only: window title, the directory that plays
//! the role of the web root for scene assets, and the default log filter.
//! Values come from `orbs.toml` when present and can be overridden through
//! environment variables. Scene constants are not configurable here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "orbs.toml";

/// Errors raised while reading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OrbsConfig {
    /// Native window settings
    pub window: WindowConfig,
    /// Asset lookup settings
    pub assets: AssetConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
}

/// Asset configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory that asset paths such as `/maps/swedishcastle/` are resolved against
    pub root: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Skyorbs".to_string() }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("public") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl AssetConfig {
    /// Resolve a web-style absolute asset path (`/maps/x/`) under the asset root.
    pub fn resolve(&self, web_path: &str) -> PathBuf {
        self.root.join(web_path.trim_start_matches('/'))
    }
}

impl OrbsConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a TOML file, or the defaults if it does not exist
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load configuration from `orbs.toml` in the current directory,
    /// or the defaults if there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_from_file_or_default(CONFIG_FILE)
    }

    /// Defaults with environment overrides applied, for when the file is unusable
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_with_env();
        config
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    fn merge_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(title) = lookup("ORBS_TITLE") {
            self.window.title = title;
        }
        if let Some(root) = lookup("ORBS_ASSET_ROOT") {
            self.assets.root = PathBuf::from(root);
        }
        if let Some(filter) = lookup("ORBS_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from orbs.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default()?;
        config.merge_with_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = OrbsConfig::default();
        assert_eq!(config.window.title, "Skyorbs");
        assert_eq!(config.assets.root, PathBuf::from("public"));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_toml_serialization() {
        let config = OrbsConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: OrbsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[assets]\nroot = \"/srv/site\"").unwrap();

        let config = OrbsConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.assets.root, PathBuf::from("/srv/site"));
        assert_eq!(config.window.title, "Skyorbs");
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window\ntitle = 3").unwrap();

        let err = OrbsConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OrbsConfig::load_from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = OrbsConfig::load_from_file_or_default(dir.path().join("orbs.toml")).unwrap();
        assert_eq!(config, OrbsConfig::default());
    }

    #[test]
    fn test_malformed_file_is_not_silently_defaulted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nfilter = [").unwrap();

        let err = OrbsConfig::load_from_file_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_unreadable_path_is_not_silently_defaulted() {
        // A directory exists but is not a readable file.
        let dir = tempfile::tempdir().unwrap();
        let err = OrbsConfig::load_from_file_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_overrides() {
        let env: HashMap<&str, &str> =
            [("ORBS_TITLE", "Orbs"), ("ORBS_ASSET_ROOT", "/tmp/assets")].into_iter().collect();

        let mut config = OrbsConfig::default();
        config.merge_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.window.title, "Orbs");
        assert_eq!(config.assets.root, PathBuf::from("/tmp/assets"));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_resolve_web_path() {
        let assets = AssetConfig { root: PathBuf::from("site") };
        assert_eq!(
            assets.resolve("/maps/swedishcastle/"),
            PathBuf::from("site/maps/swedishcastle/")
        );
    }
}
