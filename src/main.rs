//! Claude Code probe service.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /  ──▶ availability gate ──▶ probe executor ──▶ classifier ──▶ JSON body (200)
//!                (startup, once)       (5s deadline,      (on error)
//!                                       first message)
//!     OPTIONS /  ──▶ 200, CORS headers only
//!     POST /     ──▶ 405, supported methods
//! ```

use std::path::PathBuf;

use clap::Parser;

use claude_probe::config::{load_config, validate_config, ConfigError, ProbeConfig};
use claude_probe::lifecycle;
use claude_probe::observability::logging;

#[derive(Parser)]
#[command(name = "claude-probe")]
#[command(about = "Diagnostic endpoint that checks connectivity to the Claude Code CLI", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProbeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "claude-probe starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cli_path = %config.backend.cli_path,
        probe_deadline_ms = config.timeouts.probe_deadline_ms,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
