//! Self-healing request layer.

pub mod channel;
pub mod fetcher;
pub mod mode;
pub mod pool;
pub mod probe;
pub mod recovery;
pub mod upstream;

pub use channel::ChannelBackoff;
pub use fetcher::Fetcher;
pub use mode::{ModeController, ModeSnapshot, ModeTransition, TierWindow, TransitionReason};
pub use pool::{HealthProbe, HttpProbe, ProxyEndpoint, ProxyHealthManager};
pub use probe::{DirectProbe, DirectProbeResult, ProbeTarget};
pub use recovery::{RecoveryAction, RecoverySupervisor, SweepReport};
pub use upstream::{FetchOutcome, RequestExecutor};
