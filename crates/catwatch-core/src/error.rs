//! Unified error types for catwatch core.

use catwatch_types::{ConfigError, ProxyError};
use thiserror::Error;

/// Main error type for catwatch core operations.
///
/// Classified upstream failures never surface here from `execute`; they are
/// returned as outcomes. This type covers setup and plumbing failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Network request failed (HTTP client).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Proxy pool operation failed.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// Result type alias for catwatch core operations.
pub type AppResult<T> = Result<T, AppError>;
