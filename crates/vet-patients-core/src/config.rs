//! Tracker configuration.
//!
//! Loaded from a TOML file; every section and field has a default, so an
//! empty file is a valid configuration.
//!
//! ```toml
//! [storage]
//! key = "patients-storage"
//! database_path = "/var/mobile/.../patients.db"
//!
//! [notices]
//! duration_ms = 3000
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::form::{DEFAULT_NOTICE_DURATION_MS, MAX_NOTICE_DURATION_MS};
use crate::store::DEFAULT_STORAGE_KEY;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notices: NoticeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: TrackerConfig =
            toml::from_str(contents).context("Failed to parse configuration TOML")?;
        if let Err(e) = config.validate() {
            bail!("Configuration validation failed: {}", e);
        }
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.notices.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Where and under which key the snapshot is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Blob key for the snapshot
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite database file; in-memory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("storage.key cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Success notice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// How long a success notice stays visible
    #[serde(default = "default_notice_duration_ms")]
    pub duration_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_notice_duration_ms(),
        }
    }
}

impl NoticeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.duration_ms == 0 || self.duration_ms > MAX_NOTICE_DURATION_MS {
            return Err(format!(
                "notices.duration_ms must be between 1 and {}",
                MAX_NOTICE_DURATION_MS
            ));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !VALID_LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }
        Ok(())
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_notice_duration_ms() -> u64 {
    DEFAULT_NOTICE_DURATION_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<TrackerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    TrackerConfig::from_toml_str(&contents)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.storage.key, "patients-storage");
        assert_eq!(config.notices.duration_ms, 3_000);
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = TrackerConfig::from_toml_str(
            r#"
            [storage]
            database_path = "/tmp/patients.db"

            [notices]
            duration_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.key, "patients-storage");
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/patients.db"))
        );
        assert_eq!(config.notices.duration_ms, 5_000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(TrackerConfig::from_toml_str("[storage]\nkey = \"  \"").is_err());
        assert!(TrackerConfig::from_toml_str("[notices]\nduration_ms = 0").is_err());
        assert!(TrackerConfig::from_toml_str("[logging]\nlevel = \"loud\"").is_err());
        assert!(TrackerConfig::from_toml_str("storage = 3").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }
}
