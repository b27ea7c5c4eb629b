//! [`MemoryStore`]: process-local TTL map.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{sync::Mutex, time, time::Instant};
use tracing::{debug, info};

use super::{SecretRecord, SecretStore, StoreError};

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe in-memory secret store.
///
/// Wraps an `Arc<Mutex<HashMap<_, _>>>` so that every operation is one critical
/// section:
/// - [`SecretStore::get_and_delete`] looks up, checks expiry, and removes under
///   a single lock acquisition, so concurrent callers for one id are serialized
///   and only the first sees the value.
/// - No `.await` happens while the lock is held. A caller cancelled while
///   waiting for the lock has applied nothing; once the lock is held the
///   operation finishes in the same poll.
///
/// Expired entries read as absent and are dropped on access. [`MemoryStore::spawn_sweep`]
/// reclaims entries nobody asks for again.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Create a new, empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Returns `true` if no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove all expired entries, returning how many were dropped.
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, e| !e.is_expired(now));
        before - map.len()
    }

    /// Spawn a background task that calls [`MemoryStore::prune`] every `interval`.
    pub fn spawn_sweep(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // First tick fires immediately; nothing can have expired yet.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.prune().await;
                if removed > 0 {
                    info!(removed, "pruned expired secrets");
                }
            }
        })
    }

    /// Insert an arbitrary raw value, bypassing record encoding.
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, id: &str, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.inner.lock().await.insert(id.to_owned(), entry);
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn put(&self, id: &str, record: &SecretRecord, ttl: Duration) -> Result<(), StoreError> {
        let value = record.to_stored()?;
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Backend(format!("ttl {ttl:?} out of range")))?;
        let mut map = self.inner.lock().await;
        if map.insert(id.to_owned(), Entry { value, expires_at }).is_some() {
            debug!(id, "overwrote existing entry");
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<SecretRecord>, StoreError> {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        let value = match map.get(id) {
            None => return Ok(None),
            Some(entry) if entry.is_expired(now) => {
                map.remove(id);
                debug!(id, "lazy-evicted expired secret");
                return Ok(None);
            }
            Some(entry) => entry.value.clone(),
        };
        drop(map);
        SecretRecord::from_stored(id, value).map(Some)
    }

    async fn get_and_delete(&self, id: &str) -> Result<Option<SecretRecord>, StoreError> {
        let now = Instant::now();
        let removed = self.inner.lock().await.remove(id);
        match removed {
            None => Ok(None),
            Some(entry) if entry.is_expired(now) => Ok(None),
            Some(entry) => SecretRecord::from_stored(id, entry.value).map(Some),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
