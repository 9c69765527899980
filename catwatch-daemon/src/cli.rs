use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "catwatch-daemon",
    about = "Catwatch - self-healing catalog poller",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    /// JSON configuration file (defaults are used when it does not exist)
    #[arg(short, long, env = "CATWATCH_CONFIG", default_value = "catwatch.json")]
    pub config: PathBuf,

    /// Proxy list file, one proxy per line (overrides `polling.proxy_file`)
    #[arg(long, env = "CATWATCH_PROXY_FILE")]
    pub proxy_file: Option<PathBuf>,

    /// Bind address for the stats API (overrides `polling.stats_bind`)
    #[arg(short, long, env = "CATWATCH_STATS_BIND")]
    pub bind: Option<String>,

    /// Write the effective configuration to `--config` and exit
    #[arg(long)]
    pub write_config: bool,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
