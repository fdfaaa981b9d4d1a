//! Configuration schema types
//!
//! This module defines the configuration structure for Tablecast as it
//! maps to the TOML file.

use crate::config::SecretString;
use crate::core::export::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Output wire format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// XML document, one element block per record
    #[default]
    Xml,
    /// Delimited text, one line per record
    Csv,
}

impl ExportFormat {
    /// File extension for default object names
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Destination backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DestinationBackend {
    /// Google Cloud Storage JSON API
    #[default]
    Gcs,
    /// Local directory tree (each bucket is a subdirectory)
    Fs,
}

/// Main Tablecast configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Serialize, Deserialize)]
pub struct TablecastConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Warehouse table to read from
    pub source: SourceConfig,

    /// Object store to write to
    pub destination: DestinationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TablecastConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.destination.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Warehouse source configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// GCP project id
    pub project: String,

    /// Dataset name
    pub dataset: String,

    /// Table name
    pub table: String,

    /// API endpoint override (emulators, tests)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Pre-resolved bearer token; resolution itself is out of scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<SecretString>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.project.is_empty() {
            return Err("source.project must not be empty".to_string());
        }
        if self.dataset.is_empty() {
            return Err("source.dataset must not be empty".to_string());
        }
        if self.table.is_empty() {
            return Err("source.table must not be empty".to_string());
        }
        Ok(())
    }

    /// Fully-qualified table reference
    pub fn table_ref(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Destination configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Backend (gcs or fs)
    #[serde(default)]
    pub backend: DestinationBackend,

    /// Bucket name (or bucket-equivalent subdirectory for fs)
    pub bucket: String,

    /// Object path within the bucket; defaults to
    /// `<table>_<timestamp>.<ext>` when omitted
    #[serde(default)]
    pub object_path: Option<String>,

    /// API endpoint override (emulators, tests); gcs backend only
    #[serde(default)]
    pub base_url: Option<String>,

    /// Pre-resolved bearer token; gcs backend only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<SecretString>,

    /// Root directory; fs backend only
    #[serde(default)]
    pub root: Option<String>,
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.is_empty() {
            return Err("destination.bucket must not be empty".to_string());
        }
        if self.backend == DestinationBackend::Fs && self.root.is_none() {
            return Err("destination.root is required when backend = 'fs'".to_string());
        }
        Ok(())
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (xml or csv)
    #[serde(default)]
    pub format: ExportFormat,

    /// Maximum attempts per tier (streaming, then buffered upload)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Exponential backoff base in seconds
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,

    /// Root element name for XML output
    #[serde(default = "default_xml_root")]
    pub xml_root_element: String,

    /// Per-record element name for XML output
    #[serde(default = "default_xml_record")]
    pub xml_record_element: String,

    /// Field delimiter for CSV output
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            retries: default_retries(),
            backoff_base_secs: default_backoff_base_secs(),
            xml_root_element: default_xml_root(),
            xml_record_element: default_xml_record(),
            csv_delimiter: default_csv_delimiter(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        self.retry_policy().validate()?;
        if self.csv_delimiter.as_bytes().len() != 1 {
            return Err("export.csv_delimiter must be a single byte".to_string());
        }
        if self.xml_root_element.is_empty() || self.xml_record_element.is_empty() {
            return Err("export XML element names must not be empty".to_string());
        }
        Ok(())
    }

    /// The retry policy both tiers run with
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.backoff_base_secs)
    }

    /// CSV delimiter as a byte (validated single-byte)
    pub fn csv_delimiter_byte(&self) -> u8 {
        self.csv_delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rotated local file as well as the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy (daily or hourly)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be 'daily' or 'hourly'",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_base_secs() -> u64 {
    2
}

fn default_xml_root() -> String {
    "Defaulters".to_string()
}

fn default_xml_record() -> String {
    "Defaulter".to_string()
}

fn default_csv_delimiter() -> String {
    ",".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
[source]
project = "student-00380"
dataset = "CL_TRANSFORMED"
table = "defaulters"

[destination]
bucket = "ikl-finance-bucket-002"
"#
    }

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: TablecastConfig = toml::from_str(minimal_toml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.format, ExportFormat::Xml);
        assert_eq!(config.export.retries, 3);
        assert_eq!(config.export.backoff_base_secs, 2);
        assert_eq!(config.export.xml_root_element, "Defaulters");
        assert_eq!(config.destination.backend, DestinationBackend::Gcs);
        assert_eq!(config.application.log_level, "info");
    }

    #[test]
    fn test_table_ref() {
        let config: TablecastConfig = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(
            config.source.table_ref(),
            "student-00380.CL_TRANSFORMED.defaulters"
        );
    }

    #[test]
    fn test_fs_backend_requires_root() {
        let toml_str = r#"
[source]
project = "p"
dataset = "d"
table = "t"

[destination]
backend = "fs"
bucket = "exports"
"#;
        let config: TablecastConfig = toml::from_str(toml_str).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("destination.root"));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let toml_str = r#"
[application]
log_level = "verbose"

[source]
project = "p"
dataset = "d"
table = "t"

[destination]
bucket = "b"
"#;
        let config: TablecastConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multi_byte_delimiter_rejected() {
        let toml_str = r#"
[source]
project = "p"
dataset = "d"
table = "t"

[destination]
bucket = "b"

[export]
csv_delimiter = "||"
"#;
        let config: TablecastConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_from_export_config() {
        let toml_str = r#"
[source]
project = "p"
dataset = "d"
table = "t"

[destination]
bucket = "b"

[export]
retries = 5
backoff_base_secs = 3
"#;
        let config: TablecastConfig = toml::from_str(toml_str).unwrap();
        let policy = config.export.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff_base_secs, 3);
    }
}
