//! Domain error types
//!
//! This module defines the closed error taxonomy for Tablecast.
//! All errors are domain-specific and don't expose third-party types.
//!
//! Only two places in the codebase are allowed to swallow an error and
//! retry: the streaming attempt loop and the buffered upload loop in
//! [`crate::core::export::ExportPipeline`]. Everything else propagates.

use thiserror::Error;

/// Main Tablecast error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TablecastError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record source errors (warehouse side)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Object store errors (destination side)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization errors (XML/CSV rendering)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Export process errors (retry exhaustion, terminal failures)
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Record-source-specific errors
///
/// Errors that occur when talking to the data warehouse. These don't
/// expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the warehouse API
    #[error("Failed to connect to warehouse: {0}")]
    ConnectionFailed(String),

    /// Table not found or inaccessible - configuration/permissions
    /// problem, never retried
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Row fetch failed mid-iteration
    #[error("Row fetch failed: {0}")]
    FetchFailed(String),

    /// Response did not match the expected wire shape
    #[error("Invalid response from warehouse: {0}")]
    InvalidResponse(String),
}

/// Object-store-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bucket not found or inaccessible - configuration/permissions
    /// problem, never retried
    #[error("Bucket not found or not accessible: {0}")]
    BucketNotFound(String),

    /// The store implementation cannot write incrementally. This is a
    /// capability gap, not a transient fault: the pipeline routes
    /// straight to the buffered fallback without retrying.
    #[error("Incremental writes not supported: {0}")]
    StreamingUnsupported(String),

    /// Failed to connect to the storage API
    #[error("Failed to connect to storage: {0}")]
    ConnectionFailed(String),

    /// A write on an open incremental handle failed
    #[error("Streaming write failed: {0}")]
    WriteFailed(String),

    /// A single-shot buffered upload failed
    #[error("Buffered upload failed: {0}")]
    UploadFailed(String),

    /// Response did not match the expected wire shape
    #[error("Invalid response from storage: {0}")]
    InvalidResponse(String),
}

impl TablecastError {
    /// Whether this error is a streaming capability gap.
    ///
    /// Capability gaps route the pipeline straight to the fallback tier
    /// with no retries.
    pub fn is_capability_gap(&self) -> bool {
        matches!(
            self,
            TablecastError::Storage(StorageError::StreamingUnsupported(_))
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TablecastError {
    fn from(err: std::io::Error) -> Self {
        TablecastError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TablecastError {
    fn from(err: serde_json::Error) -> Self {
        TablecastError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TablecastError {
    fn from(err: toml::de::Error) -> Self {
        TablecastError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tablecast_error_display() {
        let err = TablecastError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_source_error_conversion() {
        let source_err = SourceError::TableNotFound("project.dataset.missing".to_string());
        let err: TablecastError = source_err.into();
        assert!(matches!(err, TablecastError::Source(_)));
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage_err = StorageError::BucketNotFound("my-bucket".to_string());
        let err: TablecastError = storage_err.into();
        assert!(matches!(err, TablecastError::Storage(_)));
    }

    #[test]
    fn test_capability_gap_detection() {
        let gap: TablecastError =
            StorageError::StreamingUnsupported("no resumable sessions".to_string()).into();
        assert!(gap.is_capability_gap());

        let transient: TablecastError =
            StorageError::WriteFailed("connection reset".to_string()).into();
        assert!(!transient.is_capability_gap());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TablecastError = io_err.into();
        assert!(matches!(err, TablecastError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TablecastError = toml_err.into();
        assert!(matches!(err, TablecastError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &TablecastError::Validation("x".to_string());
        let _: &dyn std::error::Error = &SourceError::FetchFailed("x".to_string());
        let _: &dyn std::error::Error = &StorageError::UploadFailed("x".to_string());
    }
}
