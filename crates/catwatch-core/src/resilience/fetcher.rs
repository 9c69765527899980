//! Fetch facade wiring every resilience component from one [`AppConfig`].

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use catwatch_types::models::StatsSnapshot;
use catwatch_types::AppConfig;

use super::channel::ChannelBackoff;
use super::mode::ModeController;
use super::pool::{HttpProbe, ProxyHealthManager};
use super::probe::{DirectProbe, ProbeTarget};
use super::recovery::RecoverySupervisor;
use super::upstream::{FetchOutcome, RequestExecutor};
use crate::error::AppResult;
use crate::modules::config::validate_config;

/// Shared entry point for poll workers. Wrap in `Arc` and clone per worker.
pub struct Fetcher {
    config: AppConfig,
    pool: Arc<ProxyHealthManager>,
    mode: Arc<ModeController>,
    executor: Arc<RequestExecutor>,
    channel: Arc<ChannelBackoff>,
    supervisor: Arc<RecoverySupervisor>,
    direct_probe: Arc<DirectProbe>,
}

impl Fetcher {
    /// Validate `config`, load `proxies` and wire the components.
    pub fn new(config: AppConfig, proxies: &[String]) -> AppResult<Self> {
        validate_config(&config)?;

        let pool = Arc::new(ProxyHealthManager::with_proxies(
            config.proxy_health.clone(),
            config.advisor.clone(),
            proxies,
        ));
        let mode = Arc::new(ModeController::new(
            config.modes.clone(),
            config.advisor.window_size,
            Arc::clone(&pool),
        ));
        let executor = Arc::new(RequestExecutor::new(
            config.executor.clone(),
            config.session.clone(),
            Arc::clone(&mode),
            Arc::clone(&pool),
        )?);
        let channel = Arc::new(ChannelBackoff::new(config.channel.clone()));
        let supervisor = Arc::new(RecoverySupervisor::new(
            Arc::clone(&mode),
            Arc::clone(&channel),
            config.recovery.clone(),
        ));
        let direct_probe = Arc::new(DirectProbe::new(
            Arc::clone(&executor),
            Arc::clone(&mode),
            Arc::clone(&pool),
            probe_target(&config),
            Duration::from_secs(config.advisor.direct_probe_interval_seconds),
        ));

        tracing::info!(
            proxies = pool.len(),
            usable = pool.usable_count(),
            mode = %mode.current_mode(),
            "Fetcher initialized"
        );

        Ok(Self { config, pool, mode, executor, channel, supervisor, direct_probe })
    }

    /// Fetch once. On failure, sleeps the suggested delay before returning.
    pub async fn fetch(&self, url: &str, params: &BTreeMap<String, String>) -> (Option<Value>, bool) {
        let outcome = self.executor.execute(url, params).await;
        if outcome.is_success() {
            return (outcome.payload, true);
        }
        if !outcome.suggested_delay.is_zero() {
            tokio::time::sleep(outcome.suggested_delay).await;
        }
        (None, false)
    }

    /// Fetch once without sleeping; the caller owns retry timing.
    pub async fn execute(&self, url: &str, params: &BTreeMap<String, String>) -> FetchOutcome {
        self.executor.execute(url, params).await
    }

    pub fn get_stats(&self) -> StatsSnapshot {
        let modes = self.mode.snapshot();
        StatsSnapshot {
            mode: modes.mode,
            seconds_in_mode: modes.seconds_in_mode,
            total_switches: modes.total_switches,
            modes: modes.modes,
            proxies: self.pool.snapshot(),
            usable_proxies: self.pool.usable_count(),
            channel: self.channel.snapshot(),
            session: self.executor.session_info(),
        }
    }

    /// Backoff tracker for the outbound notification sender.
    pub fn channel(&self) -> Arc<ChannelBackoff> {
        Arc::clone(&self.channel)
    }

    /// Start the recovery sweep, proxy re-test and direct probe tasks.
    pub fn spawn_background(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let health = &self.config.proxy_health;
        let probe = Arc::new(HttpProbe::new(
            health.probe_url.clone(),
            Duration::from_secs(health.probe_timeout_seconds),
        ));

        vec![
            self.supervisor.start(shutdown.clone()),
            self.pool.start_health_task(probe, shutdown.clone()),
            self.direct_probe.start(shutdown),
        ]
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> &Arc<ModeController> {
        &self.mode
    }

    pub fn pool(&self) -> &Arc<ProxyHealthManager> {
        &self.pool
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn supervisor(&self) -> &Arc<RecoverySupervisor> {
        &self.supervisor
    }
}

/// Configured probe URL, else the first polling topic.
fn probe_target(config: &AppConfig) -> Option<ProbeTarget> {
    if let Some(url) = &config.advisor.direct_probe_url {
        return Some(ProbeTarget { url: url.clone(), params: BTreeMap::new() });
    }
    config
        .polling
        .topics
        .first()
        .map(|topic| ProbeTarget { url: topic.url.clone(), params: topic.params.clone() })
}
