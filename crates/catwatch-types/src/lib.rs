//! # Catwatch Types
//!
//! Core types, models, and error definitions for catwatch.
//!
//! - **`error`** - Typed error hierarchy for fetches, proxies, and configuration
//! - **`models`** - Request tiers, outcome classes, configuration, and stats snapshots
//!
//! ## Architecture Role
//!
//! `catwatch-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!        catwatch-types (this crate)
//!                │
//!                ▼
//!          catwatch-core
//!                │
//!                ▼
//!         catwatch-daemon
//! ```

pub mod error;
pub mod models;

pub use error::{ChannelError, ConfigError, FetchError, ProxyError};

pub use models::{
    AppConfig, ChannelEvent, ModeStats, OutcomeClass, ProxyHealthEntry, RequestMode,
    StatsSnapshot,
};
