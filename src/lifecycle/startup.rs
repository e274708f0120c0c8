//! Startup orchestration.
//!
//! # Responsibilities
//! - Check backend availability once
//! - Start the metrics exporter if enabled
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Config arrives already validated
//! - An unavailable backend is not fatal; GET reports it instead
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::backend::{Availability, CliBackend};
use crate::config::ProbeConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the service with the given configuration until shutdown.
pub async fn run(config: ProbeConfig) -> Result<(), StartupError> {
    let cli_path = config.backend.cli_path.clone();
    let availability = Availability::detect(
        &cli_path,
        Duration::from_secs(config.backend.detect_timeout_secs),
    )
    .await;

    let backend = match &availability {
        Availability::Available { version } => CliBackend::new(cli_path).with_version(version.clone()),
        Availability::Unavailable { .. } => CliBackend::new(cli_path),
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config, Arc::new(backend), availability);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
