//! HTTP server setup and request routing.
//!
//! # Responsibilities
//! - Create the Axum router for the probe endpoint
//! - Wire up middleware (CORS headers, tracing, request ID, timeout)
//! - Dispatch GET / HEAD / OPTIONS / POST to their handlers
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::backend::{Availability, Backend};
use crate::config::ProbeConfig;
use crate::http::cors::cors_headers;
use crate::http::request::{make_request_span, request_id_layers};
use crate::http::response::{ApiResponse, MethodNotAllowed};
use crate::observability::metrics;
use crate::probe::{classify, ProbeExecutor};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub availability: Arc<Availability>,
    pub executor: Arc<ProbeExecutor>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, availability: Availability, executor: ProbeExecutor) -> Self {
        Self {
            backend,
            availability: Arc::new(availability),
            executor: Arc::new(executor),
        }
    }
}

/// HTTP server for the probe endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and backend.
    pub fn new(config: &ProbeConfig, backend: Arc<dyn Backend>, availability: Availability) -> Self {
        let executor = ProbeExecutor::new(config.timeouts.probe_deadline());
        let state = AppState::new(backend, availability, executor);
        let router = build_router(state, config.timeouts.request_timeout());
        Self { router }
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let probe_routes = get(run_probe)
        .head(preflight)
        .options(preflight)
        .post(reject_post);

    Router::new()
        .route("/", probe_routes.clone())
        .route("/api/test-claude", probe_routes)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors_headers())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(request_id_layers())
}

/// GET: gate check, then one bounded probe.
async fn run_probe(State(state): State<AppState>) -> ApiResponse {
    let started = Instant::now();

    let response = if let Some(load_error) = state.availability.load_error() {
        tracing::warn!(error = %load_error, "Backend unavailable; skipping probe");
        ApiResponse::unavailable(load_error)
    } else {
        tracing::info!("Probe starting");
        match state.executor.run(state.backend.as_ref()).await {
            Ok(result) => {
                tracing::info!(
                    message_count = result.message_count,
                    processing_time_seconds = result.processing_time_seconds,
                    "Probe succeeded"
                );
                ApiResponse::success(result)
            }
            Err(e) => {
                let classified = classify(&e);
                tracing::error!(error = %e, kind = %classified.kind, "Probe failed");
                ApiResponse::failure(classified)
            }
        }
    };

    metrics::record_probe(response.outcome(), started);
    response
}

/// OPTIONS (and HEAD): headers only, never touches the backend.
/// CORS headers come from the CORS layers.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// POST: not supported in this version.
async fn reject_post() -> MethodNotAllowed {
    MethodNotAllowed::default()
}
