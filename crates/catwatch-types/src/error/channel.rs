//! Outbound channel errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the outbound channel tracker.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ChannelError {
    /// Result kind is not one of `rate_limited`, `conflict`, `transient`, `success`
    #[error("Unknown channel event '{kind}'")]
    UnknownEvent { kind: String },
}
