//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No secret material** (`encryptedText`, `iv`) may appear in any span
//!   attribute or log field. Ids and operation names may.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   overrides it.

pub mod init;

pub use init::{init_telemetry, shutdown};
