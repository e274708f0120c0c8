//! Probe subsystem.
//!
//! # Data Flow
//! ```text
//! GET request (backend available)
//!     → executor.rs (one bounded query, first message only)
//!     → Ok(ProbeResult)  → rendered as success
//!     → Err(ProbeError)  → classifier.rs → ClassifiedError → rendered as error
//! ```
//!
//! # Design Decisions
//! - Exactly one backend call per probe; no retries
//! - Deadline is the only cancellation mechanism
//! - Classification is a pure function of the error text

pub mod classifier;
pub mod executor;

pub use classifier::{classify, ClassifiedError, ErrorKind};
pub use executor::{ProbeError, ProbeExecutor, ProbeRequest, ProbeResult};
