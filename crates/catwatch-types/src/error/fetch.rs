//! Classified upstream failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::OutcomeClass;

/// A failed catalog request, classified by what the upstream did.
///
/// Every variant is recoverable: it feeds counters and backoff, never aborts.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum FetchError {
    /// Upstream answered 429
    #[error("Rate limited (429){}", retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited {
        /// Parsed `Retry-After` header, if any
        retry_after_secs: Option<u64>,
    },

    /// Upstream answered 403
    #[error("Forbidden (403)")]
    Forbidden,

    /// Upstream answered 521 or another 5xx
    #[error("Upstream down ({status})")]
    UpstreamDown {
        /// HTTP status code
        status: u16,
    },

    /// Any other non-success response, including 200 with an unparseable body
    #[error("HTTP error ({status}): {message}")]
    OtherHttp {
        /// HTTP status code
        status: u16,
        /// Short description
        message: String,
    },

    /// Connection or timeout failure before a status code was obtained
    #[error("Network error: {message}")]
    Network {
        /// Transport error text
        message: String,
    },
}

impl FetchError {
    /// The outcome class this error belongs to.
    pub const fn class(&self) -> OutcomeClass {
        match self {
            Self::RateLimited { .. } => OutcomeClass::RateLimited,
            Self::Forbidden => OutcomeClass::Forbidden,
            Self::UpstreamDown { .. } => OutcomeClass::UpstreamDown,
            Self::OtherHttp { .. } => OutcomeClass::OtherHttpError,
            Self::Network { .. } => OutcomeClass::NetworkError,
        }
    }
}
