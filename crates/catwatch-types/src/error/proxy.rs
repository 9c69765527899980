//! Proxy pool errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the proxy pool.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ProxyError {
    /// Pool is empty or every proxy is blacklisted
    #[error("No proxy available: {reason}")]
    NoProxyAvailable { reason: String },

    /// A proxy entry could not be parsed
    #[error("Invalid proxy '{raw}': {message}")]
    InvalidProxy { raw: String, message: String },

    /// Building a reqwest client for the proxy failed
    #[error("Failed to build client for proxy {url}: {message}")]
    ClientBuild { url: String, message: String },

    /// Proxy is not part of the pool
    #[error("Unknown proxy: {url}")]
    UnknownProxy { url: String },
}
