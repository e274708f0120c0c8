//! Backend client subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     availability.rs (run `<cli> --version` once)
//!     → Availability (immutable, shared via Arc)
//!
//! Per probe:
//!     Backend::query(prompt, options)
//!     → cli.rs (spawn CLI, stdout lines, exit status)
//!     → message.rs (one Message per line)
//!     → MessageStream consumed by the probe executor
//! ```
//!
//! # Design Decisions
//! - The backend is a trait so the HTTP layer can be driven by a test double
//! - Streams are lazy; dropping one releases the underlying process
//! - No retries at this layer

pub mod availability;
pub mod cli;
pub mod message;

use futures_util::stream::BoxStream;

pub use availability::Availability;
pub use cli::CliBackend;
pub use message::Message;

/// Lazily produced backend messages. Dropping the stream abandons the call.
pub type MessageStream = BoxStream<'static, Result<Message, BackendError>>;

/// A conversational backend that answers a prompt with a stream of messages.
pub trait Backend: Send + Sync {
    /// Start a query. The returned stream yields messages as they arrive.
    fn query(&self, prompt: &str, options: &QueryOptions) -> Result<MessageStream, BackendError>;

    /// Human-readable label for the implementation answering the query.
    fn label(&self) -> String;
}

/// Errors raised by a backend while starting or streaming a query.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backend output stream unavailable")]
    MissingStdout,

    #[error("failed reading backend output: {0}")]
    Read(#[source] std::io::Error),

    #[error("backend exited with {}: {stderr}", describe_code(*.code))]
    Exited { code: Option<i32>, stderr: String },

    #[error("backend reported {subtype}: {result}")]
    Reported { subtype: String, result: String },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

/// Output format requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    StreamJson,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::StreamJson => "stream-json",
        }
    }
}

/// Permission mode the backend runs tools under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionMode {
    #[default]
    Default,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
        }
    }
}

/// Options passed to the backend when constructing a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub max_turns: u32,
    pub allowed_tools: Vec<String>,
    pub output_format: OutputFormat,
    pub permission_mode: PermissionMode,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_turns: 1,
            allowed_tools: Vec::new(),
            output_format: OutputFormat::Text,
            permission_mode: PermissionMode::Default,
        }
    }
}
