//! Claude Code connectivity probe.
//!
//! A single diagnostic HTTP endpoint that sends one bounded-time prompt to
//! the Claude Code CLI and reports a structured, classified result.

pub mod backend;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::ProbeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
