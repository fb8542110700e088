//! Configuration structures for proplake.
//!
//! Configuration is loaded from TOML files and can be overridden via CLI
//! flags. Every stage receives its configuration explicitly; there are no
//! global paths or URLs.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Upstream listing source configuration
    pub source: SourceConfig,

    /// Data lake storage configuration
    pub lake: LakeConfig,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Upstream listing source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Base URL of the listing API
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

/// Data lake storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LakeConfig {
    /// Lake root (local path, or `s3://bucket/prefix`)
    pub root_path: String,

    /// Bronze table prefix under the lake root
    #[serde(default = "default_bronze_table")]
    pub bronze_table: String,

    /// Silver table prefix under the lake root
    #[serde(default = "default_silver_table")]
    pub silver_table: String,

    /// AWS region (for S3 roots)
    pub aws_region: Option<String>,

    /// AWS access key ID
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key
    pub aws_secret_access_key: Option<String>,

    /// S3 endpoint (for MinIO or other S3-compatible storage)
    pub s3_endpoint: Option<String>,
}

/// Monitoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

/// Log format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text format (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

// Default value functions
fn default_request_timeout_seconds() -> u64 {
    30
}
fn default_bronze_table() -> String {
    "bronze/realestateapi".to_string()
}
fn default_silver_table() -> String {
    "silver/realestateapi".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.source.base_url.is_empty() {
            return Err(crate::Error::Config("Source base URL is required".into()));
        }

        if self.lake.root_path.is_empty() {
            return Err(crate::Error::Config("Lake root path is required".into()));
        }

        if self.lake.bronze_table.is_empty() || self.lake.silver_table.is_empty() {
            return Err(crate::Error::Config(
                "Bronze and silver table prefixes are required".into(),
            ));
        }

        if self.lake.bronze_table == self.lake.silver_table {
            return Err(crate::Error::Config(
                "Bronze and silver tables must not share a prefix".into(),
            ));
        }

        Ok(())
    }
}
