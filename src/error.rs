//! Error types for marketo-extract
//!
//! This module defines the error hierarchy for the whole extractor.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::types::Record;
use thiserror::Error;

/// The main error type for marketo-extract
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration / Validation Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Unknown endpoint: {name}")]
    UnknownEndpoint { name: String },

    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Pagination failed after {} records: {message}", partial.len())]
    Pagination {
        message: String,
        /// Records accumulated before the failure
        partial: Vec<Record>,
    },

    #[error("Bulk export failed: {message}")]
    Export { message: String },

    #[error("Bulk export {export_id} did not complete after {attempts} status polls")]
    ExportTimeout { export_id: String, attempts: u32 },

    #[error("Normalization failed: {message}")]
    Normalization { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown endpoint error
    pub fn unknown_endpoint(name: impl Into<String>) -> Self {
        Self::UnknownEndpoint { name: name.into() }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a pagination error carrying the records fetched so far
    pub fn pagination(message: impl Into<String>, partial: Vec<Record>) -> Self {
        Self::Pagination {
            message: message.into(),
            partial,
        }
    }

    /// Create a bulk export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Create a normalization error
    pub fn normalization(message: impl Into<String>) -> Self {
        Self::Normalization {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Records salvaged from a failed pagination, if any
    pub fn partial_records(&self) -> Option<&[Record]> {
        match self {
            Error::Pagination { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// True for errors raised while validating configuration, before any request
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::InvalidConfigValue { .. }
                | Error::UnknownEndpoint { .. }
                | Error::UnsupportedFormat { .. }
                | Error::YamlParse(_)
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for marketo-extract
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::unknown_endpoint("opportunities");
        assert_eq!(err.to_string(), "Unknown endpoint: opportunities");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::ExportTimeout {
            export_id: "abc".to_string(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "Bulk export abc did not complete after 3 status polls"
        );
    }

    #[test]
    fn test_pagination_error_keeps_partial() {
        let mut record = Record::new();
        record.insert("id".to_string(), serde_json::json!(1));

        let err = Error::pagination("missing nextPageToken", vec![record]);
        assert_eq!(err.partial_records().map(<[Record]>::len), Some(1));
        assert!(err.to_string().contains("after 1 records"));
        assert!(Error::export("boom").partial_records().is_none());
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::unknown_endpoint("x").is_validation());
        assert!(Error::UnsupportedFormat {
            format: "avro".to_string()
        }
        .is_validation());
        assert!(!Error::auth("denied").is_validation());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(401, "").is_retryable());
        assert!(!Error::auth("bad").is_retryable());
    }
}
