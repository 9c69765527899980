//! Per-proxy health state.

use chrono::{DateTime, Utc};

use catwatch_types::models::{ProxyHealthConfig, ProxyHealthEntry};

use super::endpoint::ProxyEndpoint;

/// Upper bound of the health score.
pub const MAX_HEALTH_SCORE: u8 = 100;

/// Health state for a single proxy.
#[derive(Debug, Clone)]
pub struct ProxyHealth {
    pub endpoint: ProxyEndpoint,
    pub health_score: u8,
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub total_successes: u64,
    pub blacklisted: bool,
    pub last_tested_at: Option<DateTime<Utc>>,
}

impl ProxyHealth {
    pub fn new(endpoint: ProxyEndpoint, initial_score: u8) -> Self {
        Self {
            endpoint,
            health_score: initial_score.min(MAX_HEALTH_SCORE),
            consecutive_failures: 0,
            total_requests: 0,
            total_successes: 0,
            blacklisted: false,
            last_tested_at: None,
        }
    }

    /// Apply a request outcome. Returns true if this call blacklisted the proxy.
    pub fn apply(&mut self, success: bool, config: &ProxyHealthConfig) -> bool {
        self.total_requests += 1;

        if success {
            self.health_score =
                self.health_score.saturating_add(config.success_step).min(MAX_HEALTH_SCORE);
            self.total_successes += 1;
            self.consecutive_failures = 0;
            return false;
        }

        self.health_score = self.health_score.saturating_sub(config.failure_step);
        self.consecutive_failures += 1;

        let exhausted = self.health_score == 0
            || self.consecutive_failures >= config.max_consecutive_failures;
        if exhausted && !self.blacklisted {
            self.blacklisted = true;
            return true;
        }
        false
    }

    /// Restore after a successful re-test.
    pub fn whitelist(&mut self, baseline_score: u8) {
        self.blacklisted = false;
        self.consecutive_failures = 0;
        self.health_score = baseline_score.min(MAX_HEALTH_SCORE);
    }

    pub fn is_usable(&self) -> bool {
        !self.blacklisted
    }

    pub fn to_entry(&self) -> ProxyHealthEntry {
        ProxyHealthEntry {
            endpoint: self.endpoint.masked(),
            health_score: self.health_score,
            consecutive_failures: self.consecutive_failures,
            total_requests: self.total_requests,
            total_successes: self.total_successes,
            blacklisted: self.blacklisted,
            last_tested_at: self.last_tested_at,
        }
    }
}
