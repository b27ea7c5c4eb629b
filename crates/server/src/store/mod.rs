//! Ephemeral secret storage.
//!
//! [`SecretStore`] is the only seam between the lifecycle and the storage
//! medium. Backends own expiry: an entry whose deadline has passed must read
//! as absent, and [`SecretStore::get_and_delete`] must be a single serialized
//! operation per key so that at most one concurrent caller receives the value.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local map behind one async mutex. Default.
//! - [`DurableStore`]: single-file redb database; survives restarts.

pub mod durable;
pub mod memory;
pub mod model;

pub use durable::DurableStore;
pub use memory::MemoryStore;
pub use model::SecretRecord;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by the storage layer.
///
/// An absent key is `Ok(None)`, never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the operation (I/O, transaction, task failure).
    #[error("store backend failure: {0}")]
    Backend(String),

    /// The stored value is neither an encoded record string nor a record object.
    #[error("corrupt record {id}: {reason}")]
    Corrupt {
        /// Key of the unreadable entry.
        id: String,
        /// Why decoding failed.
        reason: String,
    },

    /// The call did not finish within the configured bound.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// TTL-bearing key-value store for [`SecretRecord`]s.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Write `record` under `id`, expiring `ttl` from now. Last write wins.
    async fn put(&self, id: &str, record: &SecretRecord, ttl: Duration) -> Result<(), StoreError>;

    /// Non-destructive read. Does not touch the expiry.
    async fn get(&self, id: &str) -> Result<Option<SecretRecord>, StoreError>;

    /// Atomically return and remove the value under `id`.
    async fn get_and_delete(&self, id: &str) -> Result<Option<SecretRecord>, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
