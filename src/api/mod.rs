//! REST API layer.
//!
//! A composable axum `Router` plus the middleware stack (role
//! authentication, audit logging) and structured JSON errors.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
