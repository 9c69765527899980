//! Mode Controller
//!
//! Three-tier state machine choosing how requests are issued:
//!
//! ```text
//! BASIC ──► ENHANCED ──► ENHANCED_PROXIED
//!              ▲                │
//!              └────────────────┘
//! ```
//!
//! A tier is left when its error counter reaches `error_threshold` or it has
//! been active for `dwell_seconds`. Entering the proxied tier requires a usable
//! proxy and, on the error rule, the advisor's agreement.

mod state;

#[cfg(test)]
mod tests;

pub use state::{ModeSnapshot, ModeTransition, TierWindow, TransitionReason};
use state::ModeState;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use catwatch_types::models::ModeConfig;
use catwatch_types::RequestMode;

use super::pool::ProxyHealthManager;
use crate::metrics;

/// Owns the active tier and its per-tier counters.
pub struct ModeController {
    state: Mutex<ModeState>,
    config: ModeConfig,
    window_size: usize,
    pool: Arc<ProxyHealthManager>,
}

impl ModeController {
    pub fn new(config: ModeConfig, window_size: usize, pool: Arc<ProxyHealthManager>) -> Self {
        Self {
            state: Mutex::new(ModeState::new(Instant::now())),
            config,
            window_size: window_size.max(1),
            pool,
        }
    }

    pub fn current_mode(&self) -> RequestMode {
        self.state.lock().current
    }

    /// Record one request outcome for `mode`.
    ///
    /// Only failures of the active tier feed its switch counter. Outcomes
    /// reported for another tier (a worker that started before the last
    /// transition) still update that tier's totals and window.
    pub fn record_outcome(&self, mode: RequestMode, success: bool) {
        let mut state = self.state.lock();
        let active = mode == state.current;
        let window_size = self.window_size;
        state.tier_mut(mode).record(success, active, window_size);
        if success && active {
            state.successes_since_switch += 1;
        }
    }

    /// Overwrite a tier's switch counter.
    #[cfg(test)]
    pub(crate) fn set_errors(&self, mode: RequestMode, errors: u32) {
        self.state.lock().tier_mut(mode).errors = errors;
    }

    /// Evaluate the switch rules now. Returns true if the tier changed.
    pub fn should_switch(&self) -> bool {
        self.should_switch_at(Instant::now()).is_some()
    }

    /// Evaluate the switch rules at `now`, transitioning if one fires.
    pub fn should_switch_at(&self, now: Instant) -> Option<ModeTransition> {
        let mut state = self.state.lock();
        let current = state.current;
        let errors = state.tier(current).errors;
        let dwell = Duration::from_secs(self.config.dwell_seconds);

        let reason = if errors >= self.config.error_threshold {
            TransitionReason::ErrorThreshold
        } else if now.saturating_duration_since(state.last_switch) >= dwell {
            TransitionReason::DwellTimeout
        } else {
            return None;
        };

        let target = current.next();
        if target.uses_proxy() {
            if reason == TransitionReason::ErrorThreshold {
                let window = state.tier(RequestMode::Enhanced).window(RequestMode::Enhanced);
                if !self.pool.should_use_proxy(&window) {
                    debug!(errors, "Enhanced errors below proxy advisory cutoff, staying");
                    state.tier_mut(current).errors = 0;
                    return None;
                }
            }
            if self.pool.usable_count() == 0 {
                warn!(
                    from = %current,
                    reason = %reason,
                    "No usable proxy, staying on enhanced tier"
                );
                state.hold(now);
                return None;
            }
        }

        let transition = state.switch_to(target, reason, now);
        drop(state);
        log_transition(&transition);
        Some(transition)
    }

    /// Leave the proxied tier because the pool could not supply a proxy.
    pub fn fallback_to_enhanced(&self, reason: TransitionReason) -> Option<ModeTransition> {
        let mut state = self.state.lock();
        if state.current != RequestMode::EnhancedProxied {
            return None;
        }
        let transition = state.switch_to(RequestMode::Enhanced, reason, Instant::now());
        drop(state);
        log_transition(&transition);
        Some(transition)
    }

    /// Force the active tier. No-op when already on `mode`.
    pub fn force_mode(&self, mode: RequestMode, reason: TransitionReason) -> Option<ModeTransition> {
        self.force_mode_at(mode, reason, Instant::now())
    }

    pub fn force_mode_at(
        &self,
        mode: RequestMode,
        reason: TransitionReason,
        now: Instant,
    ) -> Option<ModeTransition> {
        let mut state = self.state.lock();
        if state.current == mode {
            return None;
        }
        let transition = state.switch_to(mode, reason, now);
        drop(state);
        log_transition(&transition);
        Some(transition)
    }

    /// Clear every tier counter and fall back to the enhanced tier when the
    /// summed counters exceed `ceiling`. Returns the cleared total.
    pub fn reset_if_runaway_at(&self, ceiling: u32, now: Instant) -> Option<u32> {
        let mut state = self.state.lock();
        let total = state.error_total();
        if total <= ceiling {
            return None;
        }

        let transition = (state.current != RequestMode::Enhanced)
            .then(|| state.switch_to(RequestMode::Enhanced, TransitionReason::RunawayErrors, now));
        for tier in &mut state.tiers {
            tier.errors = 0;
        }
        state.last_switch = now;
        state.successes_since_switch = 0;
        drop(state);

        warn!(total, ceiling, "Runaway tier errors, counters cleared");
        if let Some(transition) = transition {
            log_transition(&transition);
        }
        Some(total)
    }

    /// Escalate one step along the tier edges when the active tier has had no
    /// success for longer than `threshold`.
    pub fn escalate_if_stuck_at(&self, threshold: Duration, now: Instant) -> Option<ModeTransition> {
        let mut state = self.state.lock();
        let idle = now.saturating_duration_since(state.last_switch);
        if idle <= threshold || state.successes_since_switch > 0 {
            return None;
        }

        let target = state.current.next();
        let transition = state.switch_to(target, TransitionReason::Stuck, now);
        drop(state);
        log_transition(&transition);
        Some(transition)
    }

    pub fn tier_window(&self, mode: RequestMode) -> TierWindow {
        self.state.lock().tier(mode).window(mode)
    }

    /// Current switch-rule counter of `mode`.
    pub fn errors(&self, mode: RequestMode) -> u32 {
        self.state.lock().tier(mode).errors
    }

    pub fn error_total(&self) -> u32 {
        self.state.lock().error_total()
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn snapshot(&self) -> ModeSnapshot {
        let state = self.state.lock();
        ModeSnapshot {
            mode: state.current,
            seconds_in_mode: state.last_switch.elapsed().as_secs(),
            total_switches: state.total_switches,
            modes: RequestMode::ALL.iter().map(|m| state.tier(*m).stats(*m)).collect(),
        }
    }
}

fn log_transition(transition: &ModeTransition) {
    info!(
        from = %transition.from,
        to = %transition.to,
        reason = %transition.reason,
        "Request mode switched"
    );
    metrics::record_mode_switch(transition.from, transition.to, transition.reason.as_str());
}
