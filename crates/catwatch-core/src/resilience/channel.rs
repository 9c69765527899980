//! Outbound channel backoff tracker.
//!
//! The notification sender reports each delivery result here and waits out
//! the pending delay before its next send. The recovery supervisor clears the
//! state when errors pile up past its ceiling.

use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use catwatch_types::models::{ChannelBackoffConfig, ChannelBackoffState};
use catwatch_types::{ChannelError, ChannelEvent};

pub struct ChannelBackoff {
    state: Mutex<ChannelBackoffState>,
    config: ChannelBackoffConfig,
}

impl ChannelBackoff {
    pub fn new(config: ChannelBackoffConfig) -> Self {
        let state = ChannelBackoffState {
            consecutive_errors: 0,
            backoff_seconds: config.floor_seconds,
            total_errors: 0,
        };
        Self { state: Mutex::new(state), config }
    }

    /// Apply one delivery result and return the new state.
    pub fn record(&self, event: ChannelEvent) -> ChannelBackoffState {
        let mut state = self.state.lock();
        if event.is_error() {
            state.consecutive_errors = state.consecutive_errors.saturating_add(1);
            state.total_errors += 1;
            state.backoff_seconds =
                state.backoff_seconds.saturating_mul(2).min(self.config.cap_seconds);
            debug!(
                event = ?event,
                consecutive_errors = state.consecutive_errors,
                backoff_seconds = state.backoff_seconds,
                "Channel error recorded"
            );
        } else {
            state.consecutive_errors = 0;
            state.backoff_seconds = self.config.floor_seconds;
        }
        *state
    }

    /// Record a result given by name (`rate_limited`, `conflict`, `transient`, `success`).
    pub fn record_kind(&self, kind: &str) -> Result<ChannelBackoffState, ChannelError> {
        let event: ChannelEvent = kind.parse()?;
        Ok(self.record(event))
    }

    /// Delay to wait before the next send, if the channel is backing off.
    pub fn pending_delay(&self) -> Option<Duration> {
        let state = self.state.lock();
        (state.consecutive_errors > 0).then(|| Duration::from_secs(state.backoff_seconds))
    }

    /// Sleep out the pending delay, if any.
    pub async fn wait(&self) {
        if let Some(delay) = self.pending_delay() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Clear the error streak and drop the backoff to its floor.
    /// Returns the cleared streak; `total_errors` is kept.
    pub fn reset(&self) -> u32 {
        let mut state = self.state.lock();
        self.clear(&mut state)
    }

    /// Reset when consecutive errors exceed `ceiling`. Returns the cleared count.
    pub fn reset_if_over(&self, ceiling: u32) -> Option<u32> {
        let mut state = self.state.lock();
        if state.consecutive_errors <= ceiling {
            return None;
        }
        let cleared = self.clear(&mut state);
        drop(state);
        info!(cleared, ceiling, "Channel backoff reset");
        Some(cleared)
    }

    pub fn snapshot(&self) -> ChannelBackoffState {
        *self.state.lock()
    }

    fn clear(&self, state: &mut ChannelBackoffState) -> u32 {
        let cleared = state.consecutive_errors;
        state.consecutive_errors = 0;
        state.backoff_seconds = self.config.floor_seconds;
        cleared
    }
}
