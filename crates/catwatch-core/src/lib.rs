//! # Catwatch Core
//!
//! Self-healing request layer for polling a rate-limited, bot-hostile catalog API.
//!
//! ## Architecture
//!
//! ```text
//! catwatch-core/src/
//! ├── resilience/
//! │   ├── mode/       # BASIC → ENHANCED → ENHANCED_PROXIED state machine
//! │   ├── pool/       # Proxy health scores, blacklist, selection, re-tests
//! │   ├── upstream/   # Request executor: headers, session, classification
//! │   ├── recovery.rs # Periodic sweep resetting runaway/stuck state
//! │   ├── channel.rs  # Outbound channel exponential backoff
//! │   ├── probe.rs    # Out-of-band "leave the proxy" probe
//! │   └── fetcher.rs  # Facade wiring everything from one AppConfig
//! ├── modules/        # Config and proxy-source loading
//! └── metrics.rs      # Metric names and recording helpers
//! ```
//!
//! Lock order is mode controller → proxy pool. No lock is held across `.await`.

#![allow(
    clippy::significant_drop_tightening,
    reason = "parking_lot guards are dropped at scope end in short critical sections"
)]
#![cfg_attr(test, allow(clippy::panic, clippy::float_cmp, clippy::unwrap_used))]

pub mod error;
pub mod metrics;
pub mod modules;
pub mod resilience;

pub use error::{AppError, AppResult};
pub use resilience::{
    ChannelBackoff, Fetcher, FetchOutcome, ModeController, ProxyHealthManager, RecoverySupervisor,
    RequestExecutor,
};
