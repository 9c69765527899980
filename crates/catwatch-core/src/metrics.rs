//! Metric names and recording helpers.
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed (the daemon installs the Prometheus exporter).
//!
//! - `catwatch_requests_total{mode,outcome}` - Counter of executed requests
//! - `catwatch_request_duration_seconds{mode}` - Histogram of request durations
//! - `catwatch_mode_switches_total{from,to,reason}` - Counter of tier transitions
//! - `catwatch_proxies_blacklisted_total` - Counter of blacklist events
//! - `catwatch_proxies_whitelisted_total` - Counter of proxies restored by re-test
//! - `catwatch_proxies_usable` - Gauge of non-blacklisted proxies
//! - `catwatch_recovery_actions_total{action}` - Counter of recovery sweep actions

use metrics::{counter, gauge, histogram};
use std::time::Duration;

use catwatch_types::{OutcomeClass, RequestMode};

pub const REQUESTS_TOTAL: &str = "catwatch_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "catwatch_request_duration_seconds";
pub const MODE_SWITCHES_TOTAL: &str = "catwatch_mode_switches_total";
pub const PROXIES_BLACKLISTED_TOTAL: &str = "catwatch_proxies_blacklisted_total";
pub const PROXIES_WHITELISTED_TOTAL: &str = "catwatch_proxies_whitelisted_total";
pub const PROXIES_USABLE: &str = "catwatch_proxies_usable";
pub const RECOVERY_ACTIONS_TOTAL: &str = "catwatch_recovery_actions_total";

/// Record a completed upstream request.
pub fn record_request(mode: RequestMode, outcome: OutcomeClass, elapsed: Duration) {
    let labels = [("mode", mode.as_str()), ("outcome", outcome.as_str())];
    counter!(REQUESTS_TOTAL, &labels).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "mode" => mode.as_str()).record(elapsed.as_secs_f64());
}

pub fn record_mode_switch(from: RequestMode, to: RequestMode, reason: &'static str) {
    let labels = [("from", from.as_str()), ("to", to.as_str()), ("reason", reason)];
    counter!(MODE_SWITCHES_TOTAL, &labels).increment(1);
}

pub fn record_blacklisted() {
    counter!(PROXIES_BLACKLISTED_TOTAL).increment(1);
}

pub fn record_whitelisted() {
    counter!(PROXIES_WHITELISTED_TOTAL).increment(1);
}

pub fn update_usable_proxies(count: usize) {
    gauge!(PROXIES_USABLE).set(count as f64);
}

pub fn record_recovery_action(action: &'static str) {
    counter!(RECOVERY_ACTIONS_TOTAL, "action" => action).increment(1);
}
