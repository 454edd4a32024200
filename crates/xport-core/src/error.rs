//! Error types for XPORT file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading XPORT files.
#[derive(Debug, Error)]
pub enum XportError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid XPORT file structure.
    #[error("invalid XPORT file: {message}")]
    InvalidFormat { message: String },

    /// Missing required header record.
    #[error("missing header: expected {expected}")]
    MissingHeader { expected: &'static str },

    /// Invalid NAMESTR (variable descriptor) record.
    #[error("invalid NAMESTR at index {index}: {message}")]
    InvalidNamestr { index: usize, message: String },

    /// Numeric header field parsing error.
    #[error("failed to parse numeric field: {field}")]
    NumericParse { field: String },

    /// Buffer smaller than the fixed record layout.
    #[error("record size mismatch: layout needs {expected} bytes, buffer has {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Requested columns do not exist in the dataset.
    #[error("column(s) not found: {}", names.join(", "))]
    ColumnsNotFound { names: Vec<String> },

    /// Text encoding label not recognized by `encoding_rs`.
    #[error("unknown text encoding: {label}")]
    UnknownEncoding { label: String },

    /// Filter spec is structurally invalid.
    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    /// CSV output error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error, propagated unchanged from the storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for XPORT operations.
pub type Result<T> = std::result::Result<T, XportError>;

impl XportError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a MissingHeader error.
    pub fn missing_header(expected: &'static str) -> Self {
        Self::MissingHeader { expected }
    }

    /// Create an InvalidFilter error.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = XportError::invalid_format("test message");
        assert_eq!(format!("{err}"), "invalid XPORT file: test message");

        let err = XportError::missing_header("LIBRARY HEADER");
        assert_eq!(format!("{err}"), "missing header: expected LIBRARY HEADER");

        let err = XportError::ColumnsNotFound {
            names: vec!["AGE".to_string(), "SEX".to_string()],
        };
        assert_eq!(format!("{err}"), "column(s) not found: AGE, SEX");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: XportError = io_err.into();
        assert!(matches!(err, XportError::Io(_)));
    }
}
