//! Proxy Health Manager implementation.

use chrono::Utc;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use catwatch_types::models::{ProxyAdvisorConfig, ProxyHealthConfig, ProxyHealthEntry};
use catwatch_types::ProxyError;

use super::advisor::ProxyAdvisor;
use super::endpoint::ProxyEndpoint;
use super::probe::HealthProbe;
use super::types::ProxyHealth;
use crate::metrics;
use crate::resilience::mode::TierWindow;

/// Result of re-testing one proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetestResult {
    /// Probe succeeded, proxy is selectable again
    Restored,
    /// Probe failed, proxy stays blacklisted
    StillFailing,
    /// Proxy was not blacklisted, nothing probed
    Skipped,
}

/// Summary of one re-test pass over the blacklisted subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetestReport {
    pub probed: usize,
    pub restored: usize,
}

/// Owns the proxy pool and its health bookkeeping.
pub struct ProxyHealthManager {
    proxies: RwLock<Vec<ProxyHealth>>,
    config: ProxyHealthConfig,
    advisor: ProxyAdvisor,
}

impl ProxyHealthManager {
    pub fn new(config: ProxyHealthConfig, advisor: ProxyAdvisorConfig) -> Self {
        Self { proxies: RwLock::new(Vec::new()), config, advisor: ProxyAdvisor::new(advisor) }
    }

    /// Build a manager and load the given raw proxy entries.
    pub fn with_proxies(
        config: ProxyHealthConfig,
        advisor: ProxyAdvisorConfig,
        raw: &[String],
    ) -> Self {
        let manager = Self::new(config, advisor);
        manager.load(raw);
        manager
    }

    /// Add proxies from the source. Invalid entries are skipped, duplicates
    /// and already-known endpoints are ignored. Returns how many were added.
    pub fn load(&self, raw: &[String]) -> usize {
        let mut proxies = self.proxies.write();
        let mut known: HashSet<String> = proxies.iter().map(|p| p.endpoint.url.clone()).collect();
        let mut added = 0;

        for entry in raw {
            match ProxyEndpoint::parse(entry) {
                Ok(endpoint) => {
                    if known.insert(endpoint.url.clone()) {
                        proxies.push(ProxyHealth::new(endpoint, self.config.initial_score));
                        added += 1;
                    }
                },
                Err(e) => tracing::error!("Skipping invalid proxy: {}", e),
            }
        }

        if added == 0 && !raw.is_empty() && proxies.is_empty() {
            tracing::error!("All {} proxy entries failed validation, proxied tier unavailable", raw.len());
        }

        let usable = proxies.iter().filter(|p| p.is_usable()).count();
        metrics::update_usable_proxies(usable);
        tracing::info!(added, pool_size = proxies.len(), "Proxy pool loaded");
        added
    }

    /// Pick a non-blacklisted proxy by health score.
    ///
    /// Candidates within `tie_margin` of the best score are chosen at random so
    /// concurrent workers do not all pile onto one proxy.
    pub fn select_proxy(&self) -> Result<ProxyEndpoint, ProxyError> {
        let proxies = self.proxies.read();
        if proxies.is_empty() {
            return Err(ProxyError::NoProxyAvailable { reason: "proxy pool is empty".to_string() });
        }

        let best = proxies
            .iter()
            .filter(|p| p.is_usable())
            .map(|p| p.health_score)
            .max()
            .ok_or_else(|| ProxyError::NoProxyAvailable {
                reason: format!("all {} proxies are blacklisted", proxies.len()),
            })?;

        let floor = best.saturating_sub(self.config.tie_margin);
        let candidates: Vec<&ProxyHealth> =
            proxies.iter().filter(|p| p.is_usable() && p.health_score >= floor).collect();

        let chosen = candidates
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| ProxyError::NoProxyAvailable { reason: "no candidates".to_string() })?;

        tracing::debug!(
            proxy = %chosen.endpoint.masked(),
            score = chosen.health_score,
            candidates = candidates.len(),
            "Selected proxy"
        );
        Ok(chosen.endpoint.clone())
    }

    /// Record the outcome of a request that used `proxy_url`.
    ///
    /// Returns true if the proxy was blacklisted as a result.
    pub fn update_health(&self, proxy_url: &str, success: bool) -> bool {
        let mut proxies = self.proxies.write();
        let Some(proxy) = proxies.iter_mut().find(|p| p.endpoint.url == proxy_url) else {
            tracing::debug!("Ignoring health update for unknown proxy");
            return false;
        };

        let blacklisted = proxy.apply(success, &self.config);
        if blacklisted {
            tracing::warn!(
                proxy = %proxy.endpoint.masked(),
                score = proxy.health_score,
                consecutive_failures = proxy.consecutive_failures,
                "Proxy blacklisted"
            );
            metrics::record_blacklisted();
            metrics::update_usable_proxies(proxies.iter().filter(|p| p.is_usable()).count());
        }
        blacklisted
    }

    /// Re-test one proxy. Only blacklisted proxies are probed.
    pub async fn retest(
        &self,
        proxy_url: &str,
        probe: &dyn HealthProbe,
    ) -> Result<RetestResult, ProxyError> {
        let endpoint = {
            let proxies = self.proxies.read();
            let proxy = proxies
                .iter()
                .find(|p| p.endpoint.url == proxy_url)
                .ok_or_else(|| ProxyError::UnknownProxy { url: proxy_url.to_string() })?;
            if !proxy.blacklisted {
                return Ok(RetestResult::Skipped);
            }
            proxy.endpoint.clone()
        };

        let healthy = probe.probe(&endpoint).await;
        Ok(self.apply_retest(&endpoint, healthy))
    }

    /// Re-test every blacklisted proxy.
    pub async fn retest_blacklisted(&self, probe: &dyn HealthProbe) -> RetestReport {
        let targets: Vec<ProxyEndpoint> = self
            .proxies
            .read()
            .iter()
            .filter(|p| p.blacklisted)
            .map(|p| p.endpoint.clone())
            .collect();

        let mut report = RetestReport::default();
        for endpoint in targets {
            let healthy = probe.probe(&endpoint).await;
            report.probed += 1;
            if self.apply_retest(&endpoint, healthy) == RetestResult::Restored {
                report.restored += 1;
            }
        }

        if report.probed > 0 {
            tracing::info!(
                probed = report.probed,
                restored = report.restored,
                "Blacklisted proxies re-tested"
            );
        }
        report
    }

    fn apply_retest(&self, endpoint: &ProxyEndpoint, healthy: bool) -> RetestResult {
        let mut proxies = self.proxies.write();
        let Some(proxy) = proxies.iter_mut().find(|p| p.endpoint.url == endpoint.url) else {
            return RetestResult::Skipped;
        };

        proxy.last_tested_at = Some(Utc::now());
        if !proxy.blacklisted {
            return RetestResult::Skipped;
        }
        if !healthy {
            return RetestResult::StillFailing;
        }

        proxy.whitelist(self.config.baseline_score);
        tracing::info!(proxy = %endpoint.masked(), score = proxy.health_score, "Proxy restored");
        metrics::record_whitelisted();
        metrics::update_usable_proxies(proxies.iter().filter(|p| p.is_usable()).count());
        RetestResult::Restored
    }

    /// Start the background re-test task.
    pub fn start_health_task(
        self: &Arc<Self>,
        probe: Arc<dyn HealthProbe>,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = Duration::from_secs(self.config.health_check_interval_seconds);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {
                        manager.retest_blacklisted(probe.as_ref()).await;
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Proxy health task shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// See [`ProxyAdvisor::should_use_proxy`].
    pub fn should_use_proxy(&self, enhanced: &TierWindow) -> bool {
        self.advisor.should_use_proxy(enhanced)
    }

    /// See [`ProxyAdvisor::should_try_without_proxy`].
    pub fn should_try_without_proxy(&self, proxied: &TierWindow) -> bool {
        self.advisor.should_try_without_proxy(proxied)
    }

    pub fn reset_direct_attempts(&self) {
        self.advisor.reset_direct_attempts();
    }

    pub fn advisor(&self) -> &ProxyAdvisor {
        &self.advisor
    }

    pub fn config(&self) -> &ProxyHealthConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.proxies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.read().is_empty()
    }

    /// Number of proxies eligible for selection.
    pub fn usable_count(&self) -> usize {
        self.proxies.read().iter().filter(|p| p.is_usable()).count()
    }

    /// Per-proxy health table.
    pub fn snapshot(&self) -> Vec<ProxyHealthEntry> {
        self.proxies.read().iter().map(ProxyHealth::to_entry).collect()
    }

    /// Health entry for one proxy (unmasked lookup key).
    pub fn health_of(&self, proxy_url: &str) -> Option<ProxyHealthEntry> {
        self.proxies.read().iter().find(|p| p.endpoint.url == proxy_url).map(ProxyHealth::to_entry)
    }
}
