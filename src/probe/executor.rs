//! Bounded probe execution.
//!
//! # Responsibilities
//! - Send the fixed probe prompt to the backend
//! - Enforce a hard wall-clock deadline from call start
//! - Stop reading after the first message and release the backend
//!
//! # Design Decisions
//! - Deadline covers spawning and streaming alike (`timeout_at`)
//! - Once the deadline elapses it wins, regardless of pending data
//! - Timing uses `tokio::time::Instant` so tests can run on paused time

use futures_util::StreamExt;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::backend::{Backend, BackendError, QueryOptions};

/// Prompt sent to the backend.
pub const PROBE_PROMPT: &str = "Hello Claude! 2+2は何ですか？日本語で短く答えて。";

/// Prompt echoed back to the caller in the result.
pub const PROBE_PROMPT_ECHO: &str = "Hello Claude! 2+2は何ですか？";

/// Default hard deadline for a probe.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// The fixed request issued on every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub prompt: String,
    pub echo: String,
    pub options: QueryOptions,
    pub max_messages: usize,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            prompt: PROBE_PROMPT.to_string(),
            echo: PROBE_PROMPT_ECHO.to_string(),
            options: QueryOptions::default(),
            max_messages: 1,
        }
    }
}

/// Outcome of a successful probe; serialized as the `data` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub prompt: String,
    pub messages: Vec<String>,
    pub message_count: usize,
    pub processing_time_seconds: f64,
    pub sdk_version: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Timeout after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Timeout: backend finished without a response")]
    Empty,
}

/// Runs one probe against a backend under a hard deadline.
#[derive(Debug, Clone)]
pub struct ProbeExecutor {
    request: ProbeRequest,
    deadline: Duration,
}

impl Default for ProbeExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_DEADLINE)
    }
}

impl ProbeExecutor {
    pub fn new(deadline: Duration) -> Self {
        Self {
            request: ProbeRequest::default(),
            deadline,
        }
    }

    pub async fn run(&self, backend: &dyn Backend) -> Result<ProbeResult, ProbeError> {
        let started = Instant::now();

        tracing::info!(prompt = %self.request.prompt, "Sending probe prompt");

        let messages = time::timeout_at(started + self.deadline, self.collect(backend))
            .await
            .map_err(|_| {
                tracing::warn!(deadline = ?self.deadline, "Probe deadline elapsed");
                ProbeError::Timeout(self.deadline)
            })??;

        let elapsed = started.elapsed();

        Ok(ProbeResult {
            prompt: self.request.echo.clone(),
            message_count: messages.len(),
            messages,
            processing_time_seconds: round_secs(elapsed),
            sdk_version: backend.label(),
        })
    }

    async fn collect(&self, backend: &dyn Backend) -> Result<Vec<String>, ProbeError> {
        let mut stream = backend.query(&self.request.prompt, &self.request.options)?;
        let mut messages = Vec::with_capacity(self.request.max_messages);

        while let Some(item) = stream.next().await {
            let message = item?;
            tracing::info!(message = %message, "Probe message received");
            messages.push(message.to_string());

            if messages.len() >= self.request.max_messages {
                break;
            }
        }

        // Release the backend now rather than when the caller is done.
        drop(stream);

        if messages.is_empty() {
            return Err(ProbeError::Empty);
        }
        Ok(messages)
    }
}

/// Round to two decimals. Replies under 5ms report `0.0`.
fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
