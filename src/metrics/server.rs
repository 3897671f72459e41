//! HTTP server for the Prometheus scrape endpoint.

use crate::exporter::Exporter;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Default scrape path.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5896;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Path serving the exposition.
    pub metrics_path: String,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], DEFAULT_PORT).into(),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

struct AppState {
    exporter: Exporter,
    metrics_path: String,
}

/// HTTP server for exposing Prometheus metrics.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<AppState>,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(config: MetricsServerConfig, exporter: Exporter) -> Self {
        let state = Arc::new(AppState {
            exporter,
            metrics_path: config.metrics_path.clone(),
        });
        Self { config, state }
    }

    /// Builds the router.
    ///
    /// - `GET {metrics_path}` polls the device and returns the exposition
    /// - `GET /` and every other unmatched path redirect to the metrics path
    /// - `GET /health` answers `OK` without touching the device
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.config.metrics_path, get(metrics_handler))
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .fallback(root_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            path = %self.config.metrics_path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.exporter.render().await {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Handler for `/` and unmatched paths: permanent redirect to the metrics path.
async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.metrics_path.clone())],
    )
}

/// Handler for the /health endpoint.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
