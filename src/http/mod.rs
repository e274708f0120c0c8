//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign x-request-id, open span)
//!     → server.rs (route by method: GET / OPTIONS / POST)
//!     → probe subsystem (GET only)
//!     → response.rs (JSON body)
//!     → cors.rs (CORS headers on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use response::{ApiResponse, Environment, ErrorBody, MethodNotAllowed};
pub use server::{build_router, AppState, HttpServer};
