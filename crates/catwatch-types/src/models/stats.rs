//! Statistics snapshots exposed to reporting surfaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RequestMode;

/// Per-tier counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModeStats {
    pub mode: RequestMode,
    /// Current consecutive-error counter used by the switch rule
    pub errors: u32,
    /// Cumulative requests issued on this tier
    pub requests: u64,
    /// Cumulative successful requests on this tier
    pub successes: u64,
    /// Success rate over the recent outcome window
    pub recent_success_rate: f64,
}

/// Health table row for one proxy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyHealthEntry {
    /// Proxy URL with credentials masked
    pub endpoint: String,
    pub health_score: u8,
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub total_successes: u64,
    pub blacklisted: bool,
    pub last_tested_at: Option<DateTime<Utc>>,
}

/// Outbound channel backoff state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChannelBackoffState {
    pub consecutive_errors: u32,
    pub backoff_seconds: u64,
    pub total_errors: u64,
}

/// Current executor session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionInfo {
    pub id: String,
    pub mode: RequestMode,
    pub requests_issued: u64,
    pub age_seconds: u64,
    pub cookies: usize,
}

/// Full snapshot returned by `get_stats()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatsSnapshot {
    pub mode: RequestMode,
    pub seconds_in_mode: u64,
    pub total_switches: u64,
    pub modes: Vec<ModeStats>,
    pub proxies: Vec<ProxyHealthEntry>,
    pub usable_proxies: usize,
    pub channel: ChannelBackoffState,
    pub session: SessionInfo,
}

impl StatsSnapshot {
    /// Counters for one tier.
    pub fn mode_stats(&self, mode: RequestMode) -> Option<&ModeStats> {
        self.modes.iter().find(|m| m.mode == mode)
    }
}
