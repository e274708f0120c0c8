//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (deadline > 0, addresses parse)
//! - Check that the outer request timeout leaves room for the probe deadline
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProbeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProbeConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("backend.cli_path must not be empty")]
    EmptyCliPath,

    #[error("timeouts.probe_deadline_ms must be greater than zero")]
    ZeroDeadline,

    #[error("timeouts.request_secs ({request_secs}s) must exceed the probe deadline ({deadline_ms}ms)")]
    RequestTimeoutTooShort { request_secs: u64, deadline_ms: u64 },

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backend.cli_path.trim().is_empty() {
        errors.push(ValidationError::EmptyCliPath);
    }

    let deadline_ms = config.timeouts.probe_deadline_ms;
    if deadline_ms == 0 {
        errors.push(ValidationError::ZeroDeadline);
    }

    if config.timeouts.request_secs.saturating_mul(1000) <= deadline_ms {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            deadline_ms,
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
