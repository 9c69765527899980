//! Read-only HTTP surface: stats snapshot, liveness and Prometheus metrics.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use catwatch_core::Fetcher;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<Fetcher>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher, started_at: Instant::now() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(get_stats))
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.fetcher.get_stats())
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.fetcher.get_stats();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "mode": stats.mode,
            "usable_proxies": stats.usable_proxies,
            "uptime_seconds": state.started_at.elapsed().as_secs(),
        })),
    )
}

async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::prometheus::render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use catwatch_types::AppConfig;

    fn app() -> Router {
        let proxies = vec!["http://10.0.0.1:8080".to_string()];
        let fetcher = Fetcher::new(AppConfig::default(), &proxies).unwrap();
        router(AppState::new(Arc::new(fetcher)))
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let server = axum_test::TestServer::new(app()).unwrap();
        let response = server.get("/api/stats").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["mode"], "basic");
        assert_eq!(body["usable_proxies"], 1);
        assert_eq!(body["proxies"][0]["health_score"], 50);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = axum_test::TestServer::new(app()).unwrap();
        let response = server.get("/healthz").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "basic");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_is_text() {
        let server = axum_test::TestServer::new(app()).unwrap();
        let response = server.get("/metrics").await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "text/plain; version=0.0.4");
    }
}
