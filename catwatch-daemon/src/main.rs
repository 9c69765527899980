//! Catwatch Daemon
//!
//! Headless poller that:
//! - Polls every configured catalog topic through the self-healing request layer
//! - Runs the recovery sweep, proxy re-tests and direct probes in the background
//! - Serves a read-only stats API on /api/stats, /healthz and /metrics

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod poller;
mod prometheus;

use catwatch_core::modules::{collect_proxies, load_config, save_config};
use catwatch_core::Fetcher;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(bind) = &cli.bind {
        config.polling.stats_bind.clone_from(bind);
    }

    if cli.write_config {
        save_config(&cli.config, &config)?;
        info!(path = %cli.config.display(), "Configuration written");
        return Ok(());
    }

    prometheus::init_metrics()?;

    let proxies = collect_proxies(&config.polling, cli.proxy_file.as_deref())?;
    let polling = config.polling.clone();
    let fetcher = Arc::new(Fetcher::new(config, &proxies)?);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        topics = polling.topics.len(),
        proxies = fetcher.pool().len(),
        "Catwatch daemon starting"
    );
    if polling.topics.is_empty() {
        tracing::warn!("No topics configured, only the stats API will run");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = fetcher.spawn_background(shutdown_rx.clone());
    tasks.extend(poller::spawn_pollers(&fetcher, &polling, &shutdown_rx));

    let addr: SocketAddr = polling
        .stats_bind
        .parse()
        .with_context(|| format!("Invalid stats bind address '{}'", polling.stats_bind))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Stats API listening on http://{}", addr);

    let app = api::router(api::AppState::new(Arc::clone(&fetcher)));
    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
    info!("Shutdown requested");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!("Background task failed: {}", e);
        }
    }
    server.await??;

    let stats = fetcher.get_stats();
    info!(mode = %stats.mode, switches = stats.total_switches, "Catwatch daemon stopped");
    Ok(())
}
