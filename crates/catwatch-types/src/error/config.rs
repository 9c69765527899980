//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration or the proxy source.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read {path}: {message}")]
    ReadError {
        /// Filesystem path that failed
        path: String,
        /// Description of the I/O failure
        message: String,
    },

    /// File could not be written
    #[error("Failed to write {path}: {message}")]
    WriteError {
        /// Filesystem path that failed
        path: String,
        /// Description of the I/O failure
        message: String,
    },

    /// Config file parse error (JSON)
    #[error("Config parse error: {message}")]
    ParseError {
        /// Description of the parse failure
        message: String,
    },

    /// Config validation error (invalid values)
    #[error("Config validation error for {field}: {message}")]
    ValidationError {
        /// Name of the field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Environment override has an unusable value
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Environment variable name
        var: String,
        /// Offending value
        value: String,
    },
}
