//! Health and metrics HTTP endpoints

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use syncip_core::SyncMetrics;
use syncip_core::scheduler::shutdown_requested;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// Prometheus text exposition content type
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// `GET /healthz`, always 200 while the process serves requests
pub fn health_router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

/// `GET /metrics` rendering the sync counters
pub fn metrics_router(metrics: Arc<SyncMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn healthz() -> &'static str {
    "OK"
}

async fn render_metrics(State(metrics): State<Arc<SyncMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        metrics.render_prometheus(),
    )
}

/// Serve `router` until the shutdown channel fires
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    info!("{} listening on {}", name, listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown_requested(&mut shutdown).await })
        .await?;

    info!("{} stopped", name);
    Ok(())
}
