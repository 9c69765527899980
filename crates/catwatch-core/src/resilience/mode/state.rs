use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use catwatch_types::{ModeStats, RequestMode};

/// Why the active tier changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// Active tier hit the consecutive error threshold
    ErrorThreshold,
    /// Active tier stayed longer than the dwell timeout
    DwellTimeout,
    /// Proxied tier found the pool empty or fully blacklisted
    NoProxyAvailable,
    /// Recovery sweep found the summed error counters over the ceiling
    RunawayErrors,
    /// Recovery sweep found no progress for too long
    Stuck,
    /// A request without proxy succeeded while in the proxied tier
    DirectProbeSucceeded,
    /// Operator or test override
    Manual,
}

impl TransitionReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransitionReason::ErrorThreshold => "error_threshold",
            TransitionReason::DwellTimeout => "dwell_timeout",
            TransitionReason::NoProxyAvailable => "no_proxy_available",
            TransitionReason::RunawayErrors => "runaway_errors",
            TransitionReason::Stuck => "stuck",
            TransitionReason::DirectProbeSucceeded => "direct_probe_succeeded",
            TransitionReason::Manual => "manual",
        }
    }
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed tier change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: RequestMode,
    pub to: RequestMode,
    pub reason: TransitionReason,
}

/// Recent-outcome view of one tier, consumed by the proxy advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierWindow {
    pub mode: RequestMode,
    pub samples: usize,
    pub successes: usize,
    pub consecutive_errors: u32,
}

impl TierWindow {
    /// Success ratio over the window, `None` when empty.
    pub fn success_rate(&self) -> Option<f64> {
        if self.samples == 0 {
            return None;
        }
        Some(self.successes as f64 / self.samples as f64)
    }
}

/// Counters for a single tier.
#[derive(Debug, Clone, Default)]
pub(crate) struct TierCounters {
    /// Switch-rule counter; cleared only when the tier is left or by recovery
    pub errors: u32,
    /// Reset on every success; feeds the advisor
    pub consecutive_errors: u32,
    pub requests: u64,
    pub successes: u64,
    window: VecDeque<bool>,
}

impl TierCounters {
    /// Record one outcome. `active` is false for late reports from workers
    /// that started before the tier was left; those skip the switch counter.
    pub fn record(&mut self, success: bool, active: bool, window_size: usize) {
        self.requests += 1;
        if success {
            self.successes += 1;
            self.consecutive_errors = 0;
        } else {
            if active {
                self.errors = self.errors.saturating_add(1);
            }
            self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        }

        self.window.push_back(success);
        while self.window.len() > window_size {
            self.window.pop_front();
        }
    }

    pub fn window(&self, mode: RequestMode) -> TierWindow {
        TierWindow {
            mode,
            samples: self.window.len(),
            successes: self.window.iter().filter(|ok| **ok).count(),
            consecutive_errors: self.consecutive_errors,
        }
    }

    pub fn stats(&self, mode: RequestMode) -> ModeStats {
        ModeStats {
            mode,
            errors: self.errors,
            requests: self.requests,
            successes: self.successes,
            recent_success_rate: self.window(mode).success_rate().unwrap_or(0.0),
        }
    }
}

/// Mutable state guarded by the controller's mutex.
#[derive(Debug)]
pub(crate) struct ModeState {
    pub current: RequestMode,
    pub tiers: [TierCounters; 3],
    pub last_switch: Instant,
    pub successes_since_switch: u64,
    pub total_switches: u64,
}

impl ModeState {
    pub fn new(now: Instant) -> Self {
        Self {
            current: RequestMode::default(),
            tiers: Default::default(),
            last_switch: now,
            successes_since_switch: 0,
            total_switches: 0,
        }
    }

    pub fn tier(&self, mode: RequestMode) -> &TierCounters {
        &self.tiers[mode.index()]
    }

    pub fn tier_mut(&mut self, mode: RequestMode) -> &mut TierCounters {
        &mut self.tiers[mode.index()]
    }

    pub fn error_total(&self) -> u32 {
        self.tiers.iter().map(|t| t.errors).fold(0, u32::saturating_add)
    }

    /// Move to `to`, clearing the outgoing tier's switch counter.
    pub fn switch_to(&mut self, to: RequestMode, reason: TransitionReason, now: Instant) -> ModeTransition {
        let from = self.current;
        self.tier_mut(from).errors = 0;
        self.current = to;
        self.last_switch = now;
        self.successes_since_switch = 0;
        self.total_switches += 1;
        ModeTransition { from, to, reason }
    }

    /// Stay on the current tier but restart its error count and dwell clock.
    pub fn hold(&mut self, now: Instant) {
        let current = self.current;
        self.tier_mut(current).errors = 0;
        self.last_switch = now;
    }
}

/// Observability view of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSnapshot {
    pub mode: RequestMode,
    pub seconds_in_mode: u64,
    pub total_switches: u64,
    pub modes: Vec<ModeStats>,
}
