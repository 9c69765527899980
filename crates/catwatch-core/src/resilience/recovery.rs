//! Recovery Supervisor
//!
//! Periodic sweep that pulls the request layer out of states the per-request
//! rules cannot leave on their own. Checks, in order:
//!
//! 1. Summed tier error counters above `critical_error_total`: clear all
//!    three and fall back to the enhanced tier.
//! 2. Otherwise, no success on the active tier for `stuck_threshold_seconds`:
//!    escalate one step.
//! 3. Channel consecutive errors above `channel_error_ceiling`: reset the
//!    channel backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info};

use catwatch_types::models::RecoveryConfig;
use catwatch_types::RequestMode;

use super::channel::ChannelBackoff;
use super::mode::ModeController;
use crate::metrics;

/// One corrective action taken by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    RunawayReset { cleared: u32 },
    StuckEscalation { from: RequestMode, to: RequestMode },
    ChannelReset { cleared: u32 },
}

impl RecoveryAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecoveryAction::RunawayReset { .. } => "runaway_reset",
            RecoveryAction::StuckEscalation { .. } => "stuck_escalation",
            RecoveryAction::ChannelReset { .. } => "channel_reset",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub actions: Vec<RecoveryAction>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

pub struct RecoverySupervisor {
    mode: Arc<ModeController>,
    channel: Arc<ChannelBackoff>,
    config: RecoveryConfig,
}

impl RecoverySupervisor {
    pub fn new(mode: Arc<ModeController>, channel: Arc<ChannelBackoff>, config: RecoveryConfig) -> Self {
        Self { mode, channel, config }
    }

    pub fn sweep(&self) -> SweepReport {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> SweepReport {
        let mut report = SweepReport::default();

        if let Some(cleared) = self.mode.reset_if_runaway_at(self.config.critical_error_total, now) {
            report.actions.push(RecoveryAction::RunawayReset { cleared });
        } else {
            let threshold = Duration::from_secs(self.config.stuck_threshold_seconds);
            if let Some(transition) = self.mode.escalate_if_stuck_at(threshold, now) {
                report
                    .actions
                    .push(RecoveryAction::StuckEscalation { from: transition.from, to: transition.to });
            }
        }

        if let Some(cleared) = self.channel.reset_if_over(self.config.channel_error_ceiling) {
            report.actions.push(RecoveryAction::ChannelReset { cleared });
        }

        for action in &report.actions {
            info!(action = ?action, "Recovery action taken");
            metrics::record_recovery_action(action.as_str());
        }
        report
    }

    /// Run the sweep every `sweep_interval_seconds` until shutdown.
    pub fn start(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let supervisor = Arc::clone(self);
        let interval = Duration::from_secs(self.config.sweep_interval_seconds);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = supervisor.sweep();
                        if report.is_empty() {
                            debug!("Recovery sweep: nothing to do");
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("Recovery supervisor shutting down");
                        break;
                    }
                }
            }
        })
    }
}
