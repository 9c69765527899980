//! Direct probe: tries leaving the proxied tier.
//!
//! While the proxied tier is active and healthy, a request without a proxy is
//! sent now and then. If it succeeds the controller drops back to the enhanced
//! tier and stops paying for proxies.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use catwatch_types::{OutcomeClass, RequestMode};

use super::mode::{ModeController, TransitionReason};
use super::pool::ProxyHealthManager;
use super::upstream::RequestExecutor;

/// URL and parameters used for direct probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub url: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectProbeResult {
    /// Active tier is not proxied; attempt counter cleared
    NotProxied,
    /// No probe target configured
    NoTarget,
    /// Advisor declined (window, cooldown or attempt cap)
    Declined,
    Failed(OutcomeClass),
    /// Switched back to the enhanced tier
    Succeeded,
}

pub struct DirectProbe {
    executor: Arc<RequestExecutor>,
    mode: Arc<ModeController>,
    pool: Arc<ProxyHealthManager>,
    target: Option<ProbeTarget>,
    interval: Duration,
}

impl DirectProbe {
    pub fn new(
        executor: Arc<RequestExecutor>,
        mode: Arc<ModeController>,
        pool: Arc<ProxyHealthManager>,
        target: Option<ProbeTarget>,
        interval: Duration,
    ) -> Self {
        Self { executor, mode, pool, target, interval }
    }

    pub async fn run_once(&self) -> DirectProbeResult {
        if self.mode.current_mode() != RequestMode::EnhancedProxied {
            self.pool.reset_direct_attempts();
            return DirectProbeResult::NotProxied;
        }
        let Some(target) = &self.target else {
            return DirectProbeResult::NoTarget;
        };

        let window = self.mode.tier_window(RequestMode::EnhancedProxied);
        if !self.pool.should_try_without_proxy(&window) {
            return DirectProbeResult::Declined;
        }

        let class = self.executor.probe_direct(&target.url, &target.params).await;
        if !class.is_success() {
            info!(class = %class, attempts = self.pool.advisor().direct_attempts(), "Direct probe failed, keeping proxies");
            return DirectProbeResult::Failed(class);
        }

        self.mode.force_mode(RequestMode::Enhanced, TransitionReason::DirectProbeSucceeded);
        self.pool.reset_direct_attempts();
        DirectProbeResult::Succeeded
    }

    pub fn start(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let probe = Arc::clone(self);
        let interval = self.interval;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {
                        let result = probe.run_once().await;
                        debug!(result = ?result, "Direct probe tick");
                    }
                    _ = shutdown.changed() => {
                        info!("Direct probe shutting down");
                        break;
                    }
                }
            }
        })
    }
}
