//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::lifecycle::{SecretLifecycle, DEFAULT_MAX_TTL, DEFAULT_STORE_TIMEOUT};
use crate::store::{MemoryStore, SecretStore};

/// Application state shared across all request handlers.
///
/// Cheaply cloneable: the lifecycle only holds an `Arc` to the store, so Axum
/// can clone the state per request without copying anything expensive.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Create / consume orchestration over the configured store.
    pub lifecycle: SecretLifecycle,
}

impl AppState {
    /// Create a new [`AppState`] around a configured lifecycle.
    pub fn new(lifecycle: SecretLifecycle) -> Self {
        Self { lifecycle }
    }

    /// Build state over `store` with default limits.
    pub fn with_store(store: Arc<dyn SecretStore>) -> Self {
        Self::new(SecretLifecycle::new(
            store,
            DEFAULT_MAX_TTL,
            DEFAULT_STORE_TIMEOUT,
        ))
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] over an empty [`MemoryStore`], suitable for tests.
    fn default() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }
}
