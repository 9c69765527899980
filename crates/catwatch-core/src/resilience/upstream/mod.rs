//! Request Executor
//!
//! Issues one catalog request in the active tier, classifies the response and
//! feeds the result back into the mode controller and proxy pool.
//!
//! `execute` never sleeps. It returns a [`FetchOutcome`] carrying the delay the
//! caller should wait before its next attempt.

mod classify;
mod headers;
mod session;
mod user_agent;


pub use classify::{classify, parse_retry_after, to_error};
pub use headers::build_headers;
pub use session::Session;
pub use user_agent::{user_agent_for_session, BASIC_USER_AGENT};

use chrono::Utc;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use catwatch_types::models::{ExecutorConfig, SessionConfig, SessionInfo};
use catwatch_types::{FetchError, OutcomeClass, ProxyError, RequestMode};

use super::mode::{ModeController, TransitionReason};
use super::pool::{ClientCache, ProxyEndpoint, ProxyHealthManager};
use crate::metrics;

/// Result of one executed request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub class: OutcomeClass,
    pub payload: Option<Value>,
    pub status: Option<u16>,
    /// Tier the request was actually issued in
    pub mode: RequestMode,
    /// Masked proxy URL, when one was used
    pub proxy: Option<String>,
    /// Delay the caller should wait before retrying; zero on success
    pub suggested_delay: Duration,
    pub elapsed: Duration,
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.class.is_success()
    }
}

/// Raw result of sending one request.
struct Attempt {
    class: OutcomeClass,
    status: Option<u16>,
    payload: Option<Value>,
    retry_after_secs: Option<u64>,
    headers: Option<HeaderMap>,
    detail: Option<String>,
}

impl Attempt {
    fn network(status: Option<u16>, detail: String) -> Self {
        Self {
            class: OutcomeClass::NetworkError,
            status,
            payload: None,
            retry_after_secs: None,
            headers: None,
            detail: Some(detail),
        }
    }
}

/// Executes catalog requests according to the active tier.
pub struct RequestExecutor {
    config: ExecutorConfig,
    session_config: SessionConfig,
    clients: ClientCache,
    mode: Arc<ModeController>,
    pool: Arc<ProxyHealthManager>,
    session: Mutex<Session>,
    /// Next failure delay per tier
    backoff: Mutex<[Duration; 3]>,
}

impl RequestExecutor {
    pub fn new(
        config: ExecutorConfig,
        session_config: SessionConfig,
        mode: Arc<ModeController>,
        pool: Arc<ProxyHealthManager>,
    ) -> Result<Self, ProxyError> {
        let clients = ClientCache::new(&config)?;
        let floor = Duration::from_millis(config.backoff_floor_ms);
        Ok(Self {
            config,
            session_config,
            clients,
            mode,
            pool,
            session: Mutex::new(Session::new(RequestMode::Basic)),
            backoff: Mutex::new([floor; 3]),
        })
    }

    /// Issue one GET in the active tier and record its outcome.
    pub async fn execute(&self, url: &str, params: &BTreeMap<String, String>) -> FetchOutcome {
        let started = Instant::now();
        let (mode, proxy) = self.resolve_route();

        let client = match self.clients.client_for(proxy.as_ref()) {
            Ok(client) => client,
            Err(e) => {
                let attempt = Attempt::network(None, e.to_string());
                return self.complete(mode, proxy.as_ref(), attempt, started);
            },
        };

        if self.refresh_session_if_needed(mode) {
            self.warm_up(&client, mode).await;
        }

        let headers = self.next_request_headers(mode);
        let attempt = send(&client, url, params, headers).await;
        self.complete(mode, proxy.as_ref(), attempt, started)
    }

    /// Out-of-band enhanced request without a proxy.
    ///
    /// Touches no counters, backoff or session statistics.
    pub async fn probe_direct(&self, url: &str, params: &BTreeMap<String, String>) -> OutcomeClass {
        let client = match self.clients.client_for(None) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Direct probe client unavailable");
                return OutcomeClass::NetworkError;
            },
        };
        let headers = {
            let session = self.session.lock();
            build_headers(RequestMode::Enhanced, &session, &self.config)
        };

        let attempt = send(&client, url, params, headers).await;
        debug!(
            class = %attempt.class,
            status = ?attempt.status,
            "Direct probe finished"
        );
        attempt.class
    }

    pub fn session_info(&self) -> SessionInfo {
        self.session.lock().info()
    }

    /// Delay that the next failure in `mode` will suggest.
    pub fn backoff_delay(&self, mode: RequestMode) -> Duration {
        self.backoff.lock()[mode.index()]
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn resolve_route(&self) -> (RequestMode, Option<ProxyEndpoint>) {
        let mode = self.mode.current_mode();
        if !mode.uses_proxy() {
            return (mode, None);
        }
        match self.pool.select_proxy() {
            Ok(proxy) => (mode, Some(proxy)),
            Err(e) => {
                warn!(error = %e, "Proxied tier without a usable proxy, falling back");
                self.mode.fallback_to_enhanced(TransitionReason::NoProxyAvailable);
                (RequestMode::Enhanced, None)
            },
        }
    }

    fn refresh_session_if_needed(&self, mode: RequestMode) -> bool {
        let mut session = self.session.lock();
        if !session.needs_refresh(mode, &self.session_config, Instant::now()) {
            return false;
        }
        let previous_requests = session.requests_issued;
        *session = Session::new(mode);
        info!(
            session_id = %session.id,
            mode = %mode,
            previous_requests,
            "Session refreshed"
        );
        true
    }

    /// Collect landing-page cookies for a fresh enhanced session.
    async fn warm_up(&self, client: &Client, mode: RequestMode) {
        if !mode.is_enhanced() {
            return;
        }
        let Some(url) = self.session_config.warmup_url.as_deref() else {
            return;
        };
        let headers = {
            let session = self.session.lock();
            build_headers(mode, &session, &self.config)
        };

        match client.get(url).headers(headers).send().await {
            Ok(resp) => {
                let absorbed = self.session.lock().absorb_cookies(resp.headers());
                debug!(status = %resp.status(), absorbed, "Session warm-up done");
            },
            Err(e) => warn!(error = %e, "Session warm-up failed"),
        }
    }

    fn next_request_headers(&self, mode: RequestMode) -> HeaderMap {
        let mut session = self.session.lock();
        session.requests_issued += 1;
        build_headers(mode, &session, &self.config)
    }

    fn next_delay(&self, mode: RequestMode, attempt: &Attempt) -> Duration {
        let floor = Duration::from_millis(self.config.backoff_floor_ms);
        let cap = Duration::from_millis(self.config.backoff_cap_ms);
        let mut backoff = self.backoff.lock();
        let slot = &mut backoff[mode.index()];

        if attempt.class.is_success() {
            *slot = floor;
            return Duration::ZERO;
        }

        let delay = *slot;
        *slot = delay.saturating_mul(self.config.backoff_multiplier).min(cap);

        match (attempt.class, attempt.retry_after_secs) {
            (OutcomeClass::RateLimited, Some(secs)) => delay.max(Duration::from_secs(secs)).min(cap),
            _ => delay,
        }
    }

    fn complete(
        &self,
        mode: RequestMode,
        proxy: Option<&ProxyEndpoint>,
        attempt: Attempt,
        started: Instant,
    ) -> FetchOutcome {
        let success = attempt.class.is_success();
        let suggested_delay = self.next_delay(mode, &attempt);

        if success {
            if let Some(headers) = &attempt.headers {
                self.session.lock().absorb_cookies(headers);
            }
        }

        self.mode.record_outcome(mode, success);
        if let Some(proxy) = proxy {
            self.pool.update_health(&proxy.url, success);
        }
        self.mode.should_switch();

        let elapsed = started.elapsed();
        metrics::record_request(mode, attempt.class, elapsed);

        let error =
            to_error(attempt.class, attempt.status, attempt.retry_after_secs, attempt.detail.as_deref());
        let proxy = proxy.map(ProxyEndpoint::masked);
        match &error {
            None => debug!(mode = %mode, elapsed_ms = elapsed.as_millis() as u64, "Request succeeded"),
            Some(e) => warn!(
                mode = %mode,
                proxy = proxy.as_deref().unwrap_or("-"),
                error = %e,
                delay_ms = suggested_delay.as_millis() as u64,
                "Request failed"
            ),
        }

        FetchOutcome {
            class: attempt.class,
            payload: attempt.payload,
            status: attempt.status,
            mode,
            proxy,
            suggested_delay,
            elapsed,
            error,
        }
    }
}

async fn send(
    client: &Client,
    url: &str,
    params: &BTreeMap<String, String>,
    headers: HeaderMap,
) -> Attempt {
    let response = match client.get(url).query(params).headers(headers).send().await {
        Ok(resp) => resp,
        Err(e) => return Attempt::network(None, e.to_string()),
    };

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return Attempt::network(Some(status), format!("body read failed: {}", e)),
    };

    let (class, payload) = classify(status, &body);
    let retry_after_secs = parse_retry_after(&headers, Utc::now());
    let detail = (!class.is_success())
        .then(|| String::from_utf8_lossy(&body[..body.len().min(200)]).into_owned());

    Attempt { class, status: Some(status), payload, retry_after_secs, headers: Some(headers), detail }
}
