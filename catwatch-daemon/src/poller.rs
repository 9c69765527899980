//! Per-topic poll workers.

use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use catwatch_core::Fetcher;
use catwatch_types::models::{PollingConfig, TopicConfig};

/// Spawn one worker per configured topic.
pub fn spawn_pollers(
    fetcher: &Arc<Fetcher>,
    polling: &PollingConfig,
    shutdown: &watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let interval = Duration::from_secs(polling.interval_seconds);
    polling
        .topics
        .iter()
        .cloned()
        .map(|topic| {
            let fetcher = Arc::clone(fetcher);
            let shutdown = shutdown.clone();
            let jitter_ms = polling.jitter_ms;
            tokio::spawn(async move { poll_topic(fetcher, topic, interval, jitter_ms, shutdown).await })
        })
        .collect()
}

async fn poll_topic(
    fetcher: Arc<Fetcher>,
    topic: TopicConfig,
    interval: Duration,
    jitter_ms: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(topic = %topic.name, "Poll worker started");
    loop {
        let poll = fetcher.fetch(&topic.url, &topic.params);
        let (payload, ok) = tokio::select! {
            result = poll => result,
            _ = shutdown.changed() => break,
        };

        match payload {
            Some(payload) if ok => {
                info!(topic = %topic.name, items = count_items(&payload), "Poll succeeded");
            },
            _ => warn!(topic = %topic.name, "Poll failed"),
        }

        let delay = interval + jitter(jitter_ms);
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }
    info!(topic = %topic.name, "Poll worker stopped");
}

fn jitter(max_ms: u64) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

/// Number of listed items in a catalog payload.
fn count_items(payload: &Value) -> usize {
    match payload {
        Value::Array(items) => items.len(),
        Value::Object(map) => ["items", "results", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(0, Vec::len),
        _ => 0,
    }
}
