//! Metrics HTTP Server
//!
//! Provides the HTTP endpoint Prometheus scrapes

use crate::collector::{Collector, ScrapeOutcome, StatusSource, UNAVAILABLE_MESSAGE};
use crate::Result;
use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Content type of the Prometheus text format
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// HTTP server for serving WireGuard peer metrics
pub struct MetricsServer<S> {
    bind_addr: SocketAddr,
    metrics_path: String,
    collector: Arc<Collector<S>>,
}

impl<S: StatusSource + 'static> MetricsServer<S> {
    /// Create a new metrics server
    pub fn new(
        bind_addr: SocketAddr,
        metrics_path: impl Into<String>,
        collector: Arc<Collector<S>>,
    ) -> Self {
        Self {
            bind_addr,
            metrics_path: metrics_path.into(),
            collector,
        }
    }

    /// Router with the metrics and health routes; used directly by tests
    pub fn create_router(&self) -> Router {
        Router::new()
            .route(&self.metrics_path, get(serve_metrics::<S>))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.collector.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.create_router();

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind metrics server to {}", self.bind_addr))?;

        info!(
            bind_addr = %self.bind_addr,
            metrics_path = %self.metrics_path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Metrics server error")?;

        info!("Metrics server stopped");
        Ok(())
    }
}

async fn serve_metrics<S: StatusSource>(State(collector): State<Arc<Collector<S>>>) -> Response {
    match collector.scrape().await {
        ScrapeOutcome::Metrics(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        ScrapeOutcome::Unavailable => {
            warn!("Answering scrape without metrics");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                UNAVAILABLE_MESSAGE,
            )
                .into_response()
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
