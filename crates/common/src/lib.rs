//! Common types, protocol definitions, and errors shared across `burnlink` crates.

pub mod envelope;
pub mod error;
pub mod protocol;

pub use error::ServiceError;
