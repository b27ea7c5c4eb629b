//! [`DurableStore`]: redb-backed secret store.
//!
//! Each value is a JSON document holding the stored record and an absolute
//! expiry in unix milliseconds. Expired entries read as absent; the sweep task
//! removes them.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time;
use tracing::{debug, info, warn};

use super::{SecretRecord, SecretStore, StoreError};

const SECRETS: TableDefinition<&str, &[u8]> = TableDefinition::new("secrets");

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    expires_at_ms: i64,
    value: Value,
}

impl StoredEntry {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Thread-safe handle to a redb-backed store.
///
/// redb serializes write transactions, so [`SecretStore::get_and_delete`] is a
/// single write transaction that reads, checks expiry, removes, and commits.
/// Blocking calls run on the blocking pool; once started, a transaction runs to
/// commit or abort even if the awaiting caller goes away.
#[derive(Clone)]
pub struct DurableStore {
    db: Arc<Database>,
    path: Arc<PathBuf>,
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DurableStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        // Ensure the table exists so read transactions never see it missing.
        let txn = db.begin_write().map_err(StoreError::backend)?;
        txn.open_table(SECRETS).map_err(StoreError::backend)?;
        txn.commit().map_err(StoreError::backend)?;

        Ok(Self {
            db: Arc::new(db),
            path: Arc::new(path.to_owned()),
        })
    }

    /// Remove all expired entries, returning how many were dropped.
    pub async fn prune(&self) -> Result<usize, StoreError> {
        self.blocking(|db| {
            let now = now_ms();
            let txn = db.begin_write().map_err(StoreError::backend)?;
            let removed = {
                let mut table = txn.open_table(SECRETS).map_err(StoreError::backend)?;
                let expired: Vec<String> = {
                    let mut keys = Vec::new();
                    for item in table.iter().map_err(StoreError::backend)? {
                        let (k, v) = item.map_err(StoreError::backend)?;
                        // Undecodable entries are left for the reader to report.
                        if let Ok(entry) = serde_json::from_slice::<StoredEntry>(v.value()) {
                            if entry.is_expired(now) {
                                keys.push(k.value().to_owned());
                            }
                        }
                    }
                    keys
                };
                for key in &expired {
                    table.remove(key.as_str()).map_err(StoreError::backend)?;
                }
                expired.len()
            };
            txn.commit().map_err(StoreError::backend)?;
            Ok(removed)
        })
        .await
    }

    /// Spawn a background task that calls [`DurableStore::prune`] every `interval`.
    pub fn spawn_sweep(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.tick().await; // skip first immediate tick
            loop {
                ticker.tick().await;
                match self.prune().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, "pruned expired secrets"),
                    Err(e) => warn!(error = %e, "background sweep error"),
                }
            }
        })
    }

    /// Run a redb operation on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StoreError::Backend(format!("blocking store task failed: {e}")))?
    }

    #[cfg(test)]
    fn insert_raw(&self, id: &str, bytes: &[u8]) {
        let txn = self.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(SECRETS).unwrap();
            table.insert(id, bytes).unwrap();
        }
        txn.commit().unwrap();
    }
}

#[async_trait]
impl SecretStore for DurableStore {
    async fn put(&self, id: &str, record: &SecretRecord, ttl: Duration) -> Result<(), StoreError> {
        let ttl_ms = i64::try_from(ttl.as_millis())
            .map_err(|_| StoreError::Backend(format!("ttl {ttl:?} out of range")))?;
        let entry = StoredEntry {
            expires_at_ms: now_ms().saturating_add(ttl_ms),
            value: record.to_stored()?,
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|e| StoreError::Backend(format!("failed to encode entry: {e}")))?;
        let id = id.to_owned();

        self.blocking(move |db| {
            let txn = db.begin_write().map_err(StoreError::backend)?;
            {
                let mut table = txn.open_table(SECRETS).map_err(StoreError::backend)?;
                table
                    .insert(id.as_str(), bytes.as_slice())
                    .map_err(StoreError::backend)?;
            }
            txn.commit().map_err(StoreError::backend)?;
            debug!(id = %id, "stored secret");
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<SecretRecord>, StoreError> {
        let key = id.to_owned();
        let raw = self
            .blocking(move |db| {
                let txn = db.begin_read().map_err(StoreError::backend)?;
                let table = txn.open_table(SECRETS).map_err(StoreError::backend)?;
                let raw = table
                    .get(key.as_str())
                    .map_err(StoreError::backend)?
                    .map(|guard| guard.value().to_vec());
                Ok(raw)
            })
            .await?;
        decode_live(id, raw)
    }

    async fn get_and_delete(&self, id: &str) -> Result<Option<SecretRecord>, StoreError> {
        let key = id.to_owned();
        let raw = self
            .blocking(move |db| {
                let txn = db.begin_write().map_err(StoreError::backend)?;
                let raw = {
                    let mut table = txn.open_table(SECRETS).map_err(StoreError::backend)?;
                    let removed = table
                        .remove(key.as_str())
                        .map_err(StoreError::backend)?
                        .map(|guard| guard.value().to_vec());
                    removed
                };
                txn.commit().map_err(StoreError::backend)?;
                Ok(raw)
            })
            .await?;
        decode_live(id, raw)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.blocking(|db| {
            let txn = db.begin_read().map_err(StoreError::backend)?;
            txn.open_table(SECRETS).map_err(StoreError::backend)?;
            Ok(())
        })
        .await
    }

    fn backend(&self) -> &'static str {
        "durable"
    }
}

/// Decode raw entry bytes, treating expired entries as absent.
fn decode_live(id: &str, raw: Option<Vec<u8>>) -> Result<Option<SecretRecord>, StoreError> {
    let Some(bytes) = raw else {
        return Ok(None);
    };
    let entry: StoredEntry = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
        id: id.to_owned(),
        reason: e.to_string(),
    })?;
    if entry.is_expired(now_ms()) {
        return Ok(None);
    }
    SecretRecord::from_stored(id, entry.value).map(Some)
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
