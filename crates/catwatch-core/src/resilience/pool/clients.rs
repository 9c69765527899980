//! Cached `reqwest::Client` per proxy for connection reuse.

use dashmap::DashMap;
use reqwest::Client;
use std::time::Duration;

use catwatch_types::models::ExecutorConfig;
use catwatch_types::ProxyError;

use super::endpoint::ProxyEndpoint;

/// Direct client plus one lazily built client per proxy URL.
pub struct ClientCache {
    direct: Client,
    clients: DashMap<String, Client>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ClientCache {
    pub fn new(config: &ExecutorConfig) -> Result<Self, ProxyError> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_seconds);
        let request_timeout = Duration::from_secs(config.request_timeout_seconds);
        let direct = base_builder(connect_timeout, request_timeout)
            .build()
            .map_err(|e| ProxyError::ClientBuild { url: "direct".to_string(), message: e.to_string() })?;

        Ok(Self { direct, clients: DashMap::new(), connect_timeout, request_timeout })
    }

    /// Client for the given proxy, or the direct client.
    pub fn client_for(&self, proxy: Option<&ProxyEndpoint>) -> Result<Client, ProxyError> {
        let Some(proxy) = proxy else {
            return Ok(self.direct.clone());
        };

        if let Some(client) = self.clients.get(&proxy.url) {
            return Ok(client.clone());
        }

        let entry = self.clients.entry(proxy.url.clone()).or_try_insert_with(|| {
            let reqwest_proxy = reqwest::Proxy::all(&proxy.url).map_err(|e| {
                ProxyError::ClientBuild { url: proxy.masked(), message: e.to_string() }
            })?;
            let client = base_builder(self.connect_timeout, self.request_timeout)
                .proxy(reqwest_proxy)
                .build()
                .map_err(|e| ProxyError::ClientBuild { url: proxy.masked(), message: e.to_string() })?;
            tracing::info!(proxy = %proxy.masked(), "Created new proxy client");
            Ok::<Client, ProxyError>(client)
        })?;

        Ok(entry.value().clone())
    }

    pub fn cached_count(&self) -> usize {
        self.clients.len()
    }
}

fn base_builder(connect_timeout: Duration, request_timeout: Duration) -> reqwest::ClientBuilder {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
}
