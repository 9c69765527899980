//! Response classification.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

use catwatch_types::{FetchError, OutcomeClass};

/// Classify a response. Success requires status 200 and a JSON body.
pub fn classify(status: u16, body: &[u8]) -> (OutcomeClass, Option<Value>) {
    let class = OutcomeClass::from_status(status);
    if !class.is_success() {
        return (class, None);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => (OutcomeClass::Success, Some(payload)),
        Err(e) => {
            tracing::debug!(error = %e, "200 response with unparseable body");
            (OutcomeClass::OtherHttpError, None)
        },
    }
}

/// Seconds to wait from a `Retry-After` header (delta-seconds or HTTP date).
pub fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    let secs = (at - now).num_seconds();
    Some(u64::try_from(secs).unwrap_or(0))
}

/// Typed error for a non-success outcome.
pub fn to_error(
    class: OutcomeClass,
    status: Option<u16>,
    retry_after_secs: Option<u64>,
    detail: Option<&str>,
) -> Option<FetchError> {
    let status_code = status.unwrap_or_default();
    match class {
        OutcomeClass::Success => None,
        OutcomeClass::RateLimited => Some(FetchError::RateLimited { retry_after_secs }),
        OutcomeClass::Forbidden => Some(FetchError::Forbidden),
        OutcomeClass::UpstreamDown => Some(FetchError::UpstreamDown { status: status_code }),
        OutcomeClass::OtherHttpError => Some(FetchError::OtherHttp {
            status: status_code,
            message: detail.unwrap_or("unexpected response").to_string(),
        }),
        OutcomeClass::NetworkError => Some(FetchError::Network {
            message: detail.unwrap_or("transport failure").to_string(),
        }),
    }
}
