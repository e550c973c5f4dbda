//! Error types for model and recording persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while saving or loading.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem error
    #[error("io error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Binary encode/decode failure
    #[error("binary serialization failed for {path}: {reason}")]
    Binary {
        /// File being read or written
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },

    /// JSON encode/decode failure
    #[error("json serialization failed for {path}: {reason}")]
    Json {
        /// File being read or written
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },

    /// The file extension does not map to a known format
    #[error("unsupported extension on {path}: expected {expected}")]
    UnsupportedExtension {
        /// Offending path
        path: PathBuf,
        /// Extensions this loader accepts
        expected: &'static str,
    },
}

/// Result type for persistence operations.
pub type IoResult<T> = Result<T, IoError>;
