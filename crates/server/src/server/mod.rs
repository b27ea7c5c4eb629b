//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Inject shared application state (`AppState`) into handlers.
//! - Translate lifecycle outcomes into HTTP responses.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use middleware::shutdown_signal;
