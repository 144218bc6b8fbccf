//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ingestion pipeline behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Which fields are tracked for change detection
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_concurrent == 0 {
            return Err(AppError::config("pipeline.max_concurrent must be > 0"));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(AppError::config("pipeline.max_attempts must be > 0"));
        }
        if self.pipeline.intake_buffer == 0 {
            return Err(AppError::config("pipeline.intake_buffer must be > 0"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(AppError::config("storage.data_dir is empty"));
        }
        if self.tracking.fields.is_empty() {
            return Err(AppError::config("tracking.fields is empty"));
        }
        Ok(())
    }
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum in-flight pipeline invocations
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Attempts per record for transient store failures
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Initial retry backoff in milliseconds (doubles per attempt)
    #[serde(default = "defaults::retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Capacity of the intake channel feeding the pipeline
    #[serde(default = "defaults::intake_buffer")]
    pub intake_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            max_attempts: defaults::max_attempts(),
            retry_backoff_ms: defaults::retry_backoff_ms(),
            intake_buffer: defaults::intake_buffer(),
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the local storage backend
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

/// Tracked-field configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Field names whose changes produce changelog events
    #[serde(default = "defaults::tracked_fields")]
    pub fields: Vec<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fields: defaults::tracked_fields(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Pipeline defaults
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_backoff_ms() -> u64 {
        200
    }
    pub fn intake_buffer() -> usize {
        64
    }

    // Storage defaults
    pub fn data_dir() -> String {
        "data/store".into()
    }

    // Tracking defaults
    pub fn tracked_fields() -> Vec<String> {
        vec![
            "price_incl_tax".into(),
            "price_excl_tax".into(),
            "availability".into(),
            "rating".into(),
            "reviews".into(),
        ]
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [pipeline]
            max_concurrent = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.max_concurrent, 2);
        assert_eq!(config.pipeline.max_attempts, 3);
        assert!(config.tracking.fields.contains(&"rating".to_string()));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.pipeline.max_concurrent = 0;
        assert!(config.validate().is_err());
    }
}
