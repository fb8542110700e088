//! Error types for the proplake core library.
//!
//! Uses hierarchical domain-specific errors following the thiserror pattern.
//! Field-level coercion failures are deliberately not modeled here: they
//! resolve to null values during schema conformance and never fail a run.

use thiserror::Error;

/// Result type alias for proplake operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for proplake.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation error (bad date bounds, inverted windows).
    /// Raised before any network or store I/O is attempted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream source error
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Table store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the upstream listing source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, DNS)
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Non-success HTTP status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded
    #[error("Response decode failed: {0}")]
    Decode(String),
}

/// Errors from the partitioned table store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object listing failed
    #[error("Listing failed under {prefix}: {message}")]
    List { prefix: String, message: String },

    /// Object read failed
    #[error("Read failed for {path}: {message}")]
    Read { path: String, message: String },

    /// Object write failed
    #[error("Write failed for {path}: {message}")]
    Write { path: String, message: String },

    /// Object delete failed
    #[error("Delete failed for {path}: {message}")]
    Delete { path: String, message: String },

    /// Parquet encode/decode error
    #[error("Parquet error: {0}")]
    Parquet(String),

    /// Arrow batch construction error
    #[error("Arrow error: {0}")]
    Arrow(String),

    /// A row is missing or carries an unusable partition key
    #[error("Partition key error: {0}")]
    Partition(String),
}

// Conversion implementations for external error types

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("from_date is later than to_date".into());
        assert_eq!(
            err.to_string(),
            "Validation error: from_date is later than to_date"
        );

        let source_err = SourceError::Status {
            url: "http://localhost:8000/houses/a/b".into(),
            status: 503,
        };
        let err: Error = source_err.into();
        assert!(err.to_string().contains("status 503"));
    }

    #[test]
    fn test_store_error() {
        let err = StoreError::Partition("row 3 has no published_at".into());
        assert!(err.to_string().contains("Partition key error"));
    }
}
