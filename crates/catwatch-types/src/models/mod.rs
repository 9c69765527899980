//! Core domain models for catwatch.

pub mod config;
mod mode;
mod stats;

pub use config::{
    AppConfig, ChannelBackoffConfig, ExecutorConfig, ModeConfig, PollingConfig,
    ProxyAdvisorConfig, ProxyHealthConfig, RecoveryConfig, SessionConfig, TopicConfig,
};
pub use mode::{ChannelEvent, OutcomeClass, RequestMode};
pub use stats::{
    ChannelBackoffState, ModeStats, ProxyHealthEntry, SessionInfo, StatsSnapshot,
};
