//! Process-wide backend availability gate.
//!
//! Runs once at startup. The outcome is immutable for the lifetime of the
//! process; a fresh check needs a restart.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;

/// Whether the backend client could be loaded when the process started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available { version: String },
    Unavailable { error: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available { .. })
    }

    /// Raw load-error text, if the backend is unavailable.
    pub fn load_error(&self) -> Option<&str> {
        match self {
            Availability::Available { .. } => None,
            Availability::Unavailable { error } => Some(error),
        }
    }

    /// Run `<program> --version` and record the outcome.
    pub async fn detect(program: &str, timeout: Duration) -> Self {
        let mut command = Command::new(program);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = command.output();

        let availability = match time::timeout(timeout, output).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let version = stdout.lines().next().unwrap_or_default().trim().to_string();
                Availability::Available { version }
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Availability::Unavailable {
                    error: format!(
                        "`{} --version` exited with {}: {}",
                        program,
                        output.status,
                        stderr.trim()
                    ),
                }
            }
            Ok(Err(e)) => Availability::Unavailable {
                error: format!("cannot load `{}`: {}", program, e),
            },
            Err(_) => Availability::Unavailable {
                error: format!(
                    "`{} --version` did not answer within {}s",
                    program,
                    timeout.as_secs_f64()
                ),
            },
        };

        match &availability {
            Availability::Available { version } => {
                tracing::info!(program, version = %version, "Backend CLI available");
            }
            Availability::Unavailable { error } => {
                tracing::warn!(program, error = %error, "Backend CLI unavailable; probes disabled");
            }
        }

        availability
    }
}
