//! Health probes used to re-test blacklisted proxies.

use async_trait::async_trait;
use std::time::Duration;

use super::endpoint::ProxyEndpoint;

/// Checks whether a proxy can currently carry traffic.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, proxy: &ProxyEndpoint) -> bool;
}

/// Lightweight GET through the proxy; any 2xx counts as healthy.
///
/// Builds a throwaway client per probe so re-tests never share connections
/// with caller traffic.
pub struct HttpProbe {
    probe_url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(probe_url: impl Into<String>, timeout: Duration) -> Self {
        Self { probe_url: probe_url.into(), timeout }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, proxy: &ProxyEndpoint) -> bool {
        let reqwest_proxy = match reqwest::Proxy::all(&proxy.url) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(proxy = %proxy.masked(), error = %e, "Probe skipped: invalid proxy");
                return false;
            },
        };

        let client = match reqwest::Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.timeout)
            .tcp_nodelay(true)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(proxy = %proxy.masked(), error = %e, "Probe client build failed");
                return false;
            },
        };

        match client.get(&self.probe_url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(proxy = %proxy.masked(), status = %resp.status(), "Probe rejected");
                false
            },
            Err(e) => {
                tracing::debug!(proxy = %proxy.masked(), error = %e, "Probe request failed");
                false
            },
        }
    }
}
