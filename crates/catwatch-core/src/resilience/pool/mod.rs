//! Proxy Health Module
//!
//! Tracks a bounded reputation score per proxy and keeps failing proxies out
//! of rotation until a re-test restores them:
//! - Score +success_step on success, -failure_step on failure, clamped to [0, 100]
//! - Blacklist on score 0 or `max_consecutive_failures` in a row
//! - Background re-test of the blacklisted subset
//! - Advisory checks for entering and leaving the proxied tier
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ProxyHealthManager                                          │
//! │  ├── proxies: RwLock<Vec<ProxyHealth>>                       │
//! │  ├── advisor: ProxyAdvisor (use / leave proxy checks)        │
//! │  └── health task: re-tests blacklisted via HealthProbe       │
//! │  ClientCache: one reqwest::Client per proxy URL              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod advisor;
mod clients;
mod endpoint;
mod manager;
mod probe;
mod types;

#[cfg(test)]
mod tests;

pub use advisor::ProxyAdvisor;
pub use clients::ClientCache;
pub use endpoint::{parse_proxy_url, ProxyEndpoint};
pub use manager::{ProxyHealthManager, RetestReport, RetestResult};
pub use probe::{HealthProbe, HttpProbe};
pub use types::{ProxyHealth, MAX_HEALTH_SCORE};
