//! `burnlink` server library.
//!
//! Stores client-encrypted secrets for a bounded time and hands each one back
//! either until it expires or, for burn-on-read secrets, exactly once.
//!
//! # Module map
//!
//! - [`id`]: unguessable URL-safe identifiers.
//! - [`store`]: the [`store::SecretStore`] trait and its backends.
//! - [`bot`]: `User-Agent` heuristic that keeps crawlers from burning secrets.
//! - [`lifecycle`]: create / consume orchestration.
//! - [`server`]: axum router, handlers, and shared state.

pub mod bot;
pub mod config;
pub mod id;
pub mod lifecycle;
pub mod server;
pub mod store;
pub mod telemetry;
