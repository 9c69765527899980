//! Prometheus exporter for the catwatch metric names.

use catwatch_core::metrics::{
    MODE_SWITCHES_TOTAL, PROXIES_BLACKLISTED_TOTAL, PROXIES_USABLE, PROXIES_WHITELISTED_TOTAL,
    RECOVERY_ACTIONS_TOTAL, REQUESTS_TOTAL, REQUEST_DURATION_SECONDS,
};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Catalog calls are short; the tail is bounded by the 30s request timeout.
const REQUEST_LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

/// Install the global recorder once and return its handle.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            REQUEST_LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    describe_counter!(REQUESTS_TOTAL, "Catalog requests by tier and outcome");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Catalog request duration in seconds");
    describe_counter!(MODE_SWITCHES_TOTAL, "Request tier transitions");
    describe_counter!(PROXIES_BLACKLISTED_TOTAL, "Proxies removed from rotation");
    describe_counter!(PROXIES_WHITELISTED_TOTAL, "Proxies restored by a re-test");
    describe_gauge!(PROXIES_USABLE, "Proxies currently eligible for selection");
    describe_counter!(RECOVERY_ACTIONS_TOTAL, "Corrective actions taken by the recovery sweep");

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Render metrics in Prometheus text format, empty if not initialized.
pub fn render() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| {
            handle.run_upkeep();
            handle.render()
        })
        .unwrap_or_default()
}
