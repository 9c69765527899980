//! Application configuration models.
//!
//! Every threshold used by the request layer lives here so tests can inject
//! small values. Durations are plain integers with a unit suffix.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

// ============================================================================
// Mode Controller
// ============================================================================

/// Tier switching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ModeConfig {
    /// Consecutive errors on the active tier before switching (default: 3)
    #[validate(range(min = 1))]
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    /// Maximum time a tier stays active before a forced re-evaluation (default: 300)
    #[validate(range(min = 1))]
    #[serde(default = "default_dwell_seconds")]
    pub dwell_seconds: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self { error_threshold: default_error_threshold(), dwell_seconds: default_dwell_seconds() }
    }
}

// ============================================================================
// Proxy Health Manager
// ============================================================================

/// Proxy scoring and blacklist policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ProxyHealthConfig {
    /// Score assigned to freshly loaded proxies (default: 50)
    #[validate(range(max = 100))]
    #[serde(default = "default_neutral_score")]
    pub initial_score: u8,
    /// Score restored by a successful re-test (default: 50)
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_neutral_score")]
    pub baseline_score: u8,
    /// Score gained per success (default: 10)
    #[serde(default = "default_success_step")]
    pub success_step: u8,
    /// Score lost per failure (default: 25)
    #[validate(range(min = 1))]
    #[serde(default = "default_failure_step")]
    pub failure_step: u8,
    /// Consecutive failures before blacklisting (default: 3)
    #[validate(range(min = 1))]
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Candidates within this many points of the best score share the pick (default: 10)
    #[serde(default = "default_tie_margin")]
    pub tie_margin: u8,
    /// Interval between blacklist re-tests (default: 300)
    #[validate(range(min = 1))]
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
    /// Lightweight URL fetched through a proxy to test it
    #[validate(length(min = 1))]
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    /// Timeout for a single re-test probe (default: 10)
    #[validate(range(min = 1))]
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
}

impl Default for ProxyHealthConfig {
    fn default() -> Self {
        Self {
            initial_score: default_neutral_score(),
            baseline_score: default_neutral_score(),
            success_step: default_success_step(),
            failure_step: default_failure_step(),
            max_consecutive_failures: default_max_consecutive_failures(),
            tie_margin: default_tie_margin(),
            health_check_interval_seconds: default_health_check_interval(),
            probe_url: default_probe_url(),
            probe_timeout_seconds: default_probe_timeout(),
        }
    }
}

/// Advisory cutoffs for entering and leaving the proxied tier.
///
/// These were tuned by trial and error; treat them as policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ProxyAdvisorConfig {
    /// Recent outcomes kept per tier (default: 20)
    #[validate(range(min = 1))]
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Enhanced-tier consecutive errors that justify a proxy (default: 3)
    #[serde(default = "default_use_proxy_consecutive_errors")]
    pub use_proxy_consecutive_errors: u32,
    /// Enhanced-tier success rate below which a proxy is justified (default: 0.5)
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_use_proxy_min_success_rate")]
    pub use_proxy_min_success_rate: f64,
    /// Minimum outcomes before the success-rate rule applies (default: 5)
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Proxied-tier outcomes required before probing without a proxy (default: 20)
    #[validate(range(min = 1))]
    #[serde(default = "default_direct_min_samples")]
    pub direct_min_samples: usize,
    /// Proxied-tier success rate required before probing without a proxy (default: 0.9)
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_direct_min_success_rate")]
    pub direct_min_success_rate: f64,
    /// Direct probes allowed per stay in the proxied tier (default: 3)
    #[serde(default = "default_max_direct_attempts")]
    pub max_direct_attempts: u32,
    /// Minimum gap between direct probes (default: 600)
    #[serde(default = "default_direct_probe_cooldown")]
    pub direct_probe_cooldown_seconds: u64,
    /// How often the direct probe task wakes up (default: 120)
    #[validate(range(min = 1))]
    #[serde(default = "default_direct_probe_interval")]
    pub direct_probe_interval_seconds: u64,
    /// Target for direct probes; falls back to the first polling topic
    #[serde(default)]
    pub direct_probe_url: Option<String>,
}

impl Default for ProxyAdvisorConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            use_proxy_consecutive_errors: default_use_proxy_consecutive_errors(),
            use_proxy_min_success_rate: default_use_proxy_min_success_rate(),
            min_samples: default_min_samples(),
            direct_min_samples: default_direct_min_samples(),
            direct_min_success_rate: default_direct_min_success_rate(),
            max_direct_attempts: default_max_direct_attempts(),
            direct_probe_cooldown_seconds: default_direct_probe_cooldown(),
            direct_probe_interval_seconds: default_direct_probe_interval(),
            direct_probe_url: None,
        }
    }
}

// ============================================================================
// Request Executor
// ============================================================================

/// HTTP client behavior and local failure backoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ExecutorConfig {
    /// Whole-request timeout (default: 30)
    #[validate(range(min = 1))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Connect timeout (default: 10)
    #[validate(range(min = 1))]
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// First backoff delay after a failure (default: 1000)
    #[validate(range(min = 1))]
    #[serde(default = "default_backoff_floor_ms")]
    pub backoff_floor_ms: u64,
    /// Backoff growth factor (default: 2)
    #[validate(range(min = 1))]
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
    /// Backoff ceiling (default: 30000)
    #[validate(range(min = 1))]
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// Referer sent by enhanced tiers
    #[serde(default)]
    pub referer: Option<String>,
    /// Origin sent by enhanced tiers
    #[serde(default)]
    pub origin: Option<String>,
    /// Accept-Language sent by enhanced tiers
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            backoff_floor_ms: default_backoff_floor_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            backoff_cap_ms: default_backoff_cap_ms(),
            referer: None,
            origin: None,
            accept_language: default_accept_language(),
        }
    }
}

/// Session refresh policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SessionConfig {
    /// Requests before the session is replaced (default: 50)
    #[validate(range(min = 1))]
    #[serde(default = "default_session_max_requests")]
    pub max_requests: u64,
    /// Session age before it is replaced (default: 1800)
    #[validate(range(min = 1))]
    #[serde(default = "default_session_max_age")]
    pub max_age_seconds: u64,
    /// Landing page fetched on refresh to collect cookies (enhanced tiers only)
    #[serde(default)]
    pub warmup_url: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_requests: default_session_max_requests(),
            max_age_seconds: default_session_max_age(),
            warmup_url: None,
        }
    }
}

// ============================================================================
// Recovery Supervisor / Channel Backoff
// ============================================================================

/// Recovery sweep cadence and ceilings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct RecoveryConfig {
    /// Sweep cadence (default: 60)
    #[validate(range(min = 1))]
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Sum of tier error counters that triggers a full reset (default: 20)
    #[serde(default = "default_critical_error_total")]
    pub critical_error_total: u32,
    /// Time without progress before a tier is escalated (default: 1800)
    #[validate(range(min = 1))]
    #[serde(default = "default_stuck_threshold")]
    pub stuck_threshold_seconds: u64,
    /// Channel consecutive errors that trigger a channel reset (default: 10)
    #[serde(default = "default_channel_error_ceiling")]
    pub channel_error_ceiling: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval(),
            critical_error_total: default_critical_error_total(),
            stuck_threshold_seconds: default_stuck_threshold(),
            channel_error_ceiling: default_channel_error_ceiling(),
        }
    }
}

/// Outbound notification channel backoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ChannelBackoffConfig {
    /// Backoff after a reset (default: 1)
    #[validate(range(min = 1))]
    #[serde(default = "default_channel_floor")]
    pub floor_seconds: u64,
    /// Backoff ceiling (default: 300)
    #[validate(range(min = 1))]
    #[serde(default = "default_channel_cap")]
    pub cap_seconds: u64,
}

impl Default for ChannelBackoffConfig {
    fn default() -> Self {
        Self { floor_seconds: default_channel_floor(), cap_seconds: default_channel_cap() }
    }
}

// ============================================================================
// Polling
// ============================================================================

/// A single catalog query polled by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct TopicConfig {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub url: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Daemon polling loop and proxy source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct PollingConfig {
    /// Delay between polls of one topic (default: 60)
    #[validate(range(min = 1))]
    #[serde(default = "default_poll_interval")]
    pub interval_seconds: u64,
    /// Random extra delay added to each poll (default: 2000)
    #[serde(default = "default_poll_jitter_ms")]
    pub jitter_ms: u64,
    #[validate(nested)]
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
    /// Inline proxy list
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Proxy list file, one entry per line
    #[serde(default)]
    pub proxy_file: Option<String>,
    /// Address for the read-only stats API
    #[serde(default = "default_stats_bind")]
    pub stats_bind: String,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_poll_interval(),
            jitter_ms: default_poll_jitter_ms(),
            topics: Vec::new(),
            proxies: Vec::new(),
            proxy_file: None,
            stats_bind: default_stats_bind(),
        }
    }
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    #[serde(default)]
    pub modes: ModeConfig,
    #[validate(nested)]
    #[serde(default)]
    pub proxy_health: ProxyHealthConfig,
    #[validate(nested)]
    #[serde(default)]
    pub advisor: ProxyAdvisorConfig,
    #[validate(nested)]
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[validate(nested)]
    #[serde(default)]
    pub session: SessionConfig,
    #[validate(nested)]
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[validate(nested)]
    #[serde(default)]
    pub channel: ChannelBackoffConfig,
    #[validate(nested)]
    #[serde(default)]
    pub polling: PollingConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_error_threshold() -> u32 {
    3
}
fn default_dwell_seconds() -> u64 {
    300
}
fn default_neutral_score() -> u8 {
    50
}
fn default_success_step() -> u8 {
    10
}
fn default_failure_step() -> u8 {
    25
}
fn default_max_consecutive_failures() -> u32 {
    3
}
fn default_tie_margin() -> u8 {
    10
}
fn default_health_check_interval() -> u64 {
    300
}
fn default_probe_url() -> String {
    "https://httpbin.org/ip".to_string()
}
fn default_probe_timeout() -> u64 {
    10
}
fn default_window_size() -> usize {
    20
}
fn default_use_proxy_consecutive_errors() -> u32 {
    3
}
fn default_use_proxy_min_success_rate() -> f64 {
    0.5
}
fn default_min_samples() -> usize {
    5
}
fn default_direct_min_samples() -> usize {
    20
}
fn default_direct_min_success_rate() -> f64 {
    0.9
}
fn default_max_direct_attempts() -> u32 {
    3
}
fn default_direct_probe_cooldown() -> u64 {
    600
}
fn default_direct_probe_interval() -> u64 {
    120
}
fn default_request_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_backoff_floor_ms() -> u64 {
    1_000
}
fn default_backoff_multiplier() -> u32 {
    2
}
fn default_backoff_cap_ms() -> u64 {
    30_000
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}
fn default_session_max_requests() -> u64 {
    50
}
fn default_session_max_age() -> u64 {
    1_800
}
fn default_sweep_interval() -> u64 {
    60
}
fn default_critical_error_total() -> u32 {
    20
}
fn default_stuck_threshold() -> u64 {
    1_800
}
fn default_channel_error_ceiling() -> u32 {
    10
}
fn default_channel_floor() -> u64 {
    1
}
fn default_channel_cap() -> u64 {
    300
}
fn default_poll_interval() -> u64 {
    60
}
fn default_poll_jitter_ms() -> u64 {
    2_000
}
fn default_stats_bind() -> String {
    "127.0.0.1:8046".to_string()
}
