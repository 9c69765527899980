//! Request tiers and outcome classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChannelError;

/// Request strategy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Plain direct calls
    #[default]
    Basic,
    /// Browser-like calls with session cookies, no proxy
    Enhanced,
    /// Browser-like calls routed through the proxy pool
    EnhancedProxied,
}

impl RequestMode {
    /// All tiers, in escalation order.
    pub const ALL: [RequestMode; 3] =
        [RequestMode::Basic, RequestMode::Enhanced, RequestMode::EnhancedProxied];

    /// Next tier along the allowed edges.
    ///
    /// Proxied falls back to Enhanced, never directly to Basic.
    pub const fn next(self) -> Self {
        match self {
            RequestMode::Basic => RequestMode::Enhanced,
            RequestMode::Enhanced => RequestMode::EnhancedProxied,
            RequestMode::EnhancedProxied => RequestMode::Enhanced,
        }
    }

    /// Stable index for per-tier arrays.
    pub const fn index(self) -> usize {
        match self {
            RequestMode::Basic => 0,
            RequestMode::Enhanced => 1,
            RequestMode::EnhancedProxied => 2,
        }
    }

    pub const fn uses_proxy(self) -> bool {
        matches!(self, RequestMode::EnhancedProxied)
    }

    /// Whether requests carry browser headers and session cookies.
    pub const fn is_enhanced(self) -> bool {
        !matches!(self, RequestMode::Basic)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RequestMode::Basic => "basic",
            RequestMode::Enhanced => "enhanced",
            RequestMode::EnhancedProxied => "enhanced_proxied",
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeClass {
    /// HTTP 200 with a parseable JSON payload
    Success,
    /// HTTP 429
    RateLimited,
    /// HTTP 403
    Forbidden,
    /// HTTP 521 or any other 5xx
    UpstreamDown,
    /// Any other HTTP failure
    OtherHttpError,
    /// Connection/timeout failure before a status code
    NetworkError,
}

impl OutcomeClass {
    /// Classify an HTTP status (success still requires a parseable body).
    pub const fn from_status(status: u16) -> Self {
        match status {
            200 => OutcomeClass::Success,
            429 => OutcomeClass::RateLimited,
            403 => OutcomeClass::Forbidden,
            500..=599 => OutcomeClass::UpstreamDown,
            _ => OutcomeClass::OtherHttpError,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, OutcomeClass::Success)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            OutcomeClass::Success => "success",
            OutcomeClass::RateLimited => "rate_limited",
            OutcomeClass::Forbidden => "forbidden",
            OutcomeClass::UpstreamDown => "upstream_down",
            OutcomeClass::OtherHttpError => "other_http_error",
            OutcomeClass::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result kinds reported by the outbound notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelEvent {
    RateLimited,
    Conflict,
    Transient,
    Success,
}

impl ChannelEvent {
    pub const fn is_error(self) -> bool {
        !matches!(self, ChannelEvent::Success)
    }
}

impl FromStr for ChannelEvent {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rate_limited" => Ok(ChannelEvent::RateLimited),
            "conflict" => Ok(ChannelEvent::Conflict),
            "transient" => Ok(ChannelEvent::Transient),
            "success" => Ok(ChannelEvent::Success),
            other => Err(ChannelError::UnknownEvent { kind: other.to_string() }),
        }
    }
}
