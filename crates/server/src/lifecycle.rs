//! Secret lifecycle: admission and consumption.
//!
//! # Create
//!
//! Validate → generate id → `put` with TTL. A store failure fails the whole
//! call; no id is returned for a record that may not exist.
//!
//! # Consume
//!
//! 1. Refuse automated callers before touching the store.
//! 2. Non-destructive `get`; absent → not found.
//! 3. Non-burn records are returned as-is.
//! 4. Burn-on-read records are answered only from `get_and_delete`, the one
//!    operation with the exactly-once guarantee. The earlier `get` merely
//!    short-circuits the common absent case.
//!
//! A failed or timed-out `get_and_delete` is never re-issued: the first attempt
//! may already have removed the record. Only a non-destructive probe follows,
//! and the outcome is reported as transient either way.
//!
//! # Invariants
//!
//! - Every store call is bounded by the configured timeout.
//! - Not-found is uniform: absent, expired, burned, refused, and malformed ids
//!   are indistinguishable to the caller.
//! - Ciphertext and IV never appear in log fields.

use std::{future::Future, sync::Arc, time::Duration};

use common::{
    protocol::{CreateSecretRequest, CreateSecretResponse, SecretEnvelope},
    ServiceError,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    bot::{self, Classification},
    id,
    store::{SecretRecord, SecretStore, StoreError},
};

/// Default upper bound on a secret's lifetime: 30 days.
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcomes surfaced by the lifecycle, besides success.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The create request is incomplete or out of range. Nothing was stored.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Absent, expired, burned, refused, or never existed.
    #[error("secret not found")]
    NotFound,

    /// The store failed, timed out, or returned an ambiguous result.
    #[error("secret store temporarily unavailable")]
    Transient,
}

impl From<LifecycleError> for ServiceError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(msg) => ServiceError::BadRequest(msg),
            LifecycleError::NotFound => ServiceError::NotFound,
            LifecycleError::Transient => {
                ServiceError::Unavailable(LifecycleError::Transient.to_string())
            }
        }
    }
}

/// Orchestrates create and consume against an injected [`SecretStore`].
///
/// Holds no mutable state of its own; cloning shares the store handle.
#[derive(Clone)]
pub struct SecretLifecycle {
    store: Arc<dyn SecretStore>,
    max_ttl: Duration,
    store_timeout: Duration,
}

impl std::fmt::Debug for SecretLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretLifecycle")
            .field("store", &self.store.backend())
            .field("max_ttl", &self.max_ttl)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl SecretLifecycle {
    /// Create a lifecycle over `store`.
    pub fn new(store: Arc<dyn SecretStore>, max_ttl: Duration, store_timeout: Duration) -> Self {
        Self {
            store,
            max_ttl,
            store_timeout,
        }
    }

    /// Name of the underlying store backend.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Bounded liveness check against the store.
    pub async fn check_store(&self) -> Result<(), StoreError> {
        self.bounded(self.store.ping()).await
    }

    /// Validate and store a new secret, returning its id.
    pub async fn create(
        &self,
        req: CreateSecretRequest,
    ) -> Result<CreateSecretResponse, LifecycleError> {
        let (record, ttl) = self.validate(req).inspect_err(|e| {
            debug!(error = %e, "rejected create request");
        })?;

        let id = id::generate();
        if let Err(e) = self.bounded(self.store.put(&id, &record, ttl)).await {
            error!(id = %id, op = "put", error = %e, "failed to store secret");
            return Err(LifecycleError::Transient);
        }

        info!(
            ttl_secs = ttl.as_secs(),
            burn_on_read = record.burn_on_read,
            "secret stored"
        );
        Ok(CreateSecretResponse { id })
    }

    /// Fetch a secret for `user_agent`, burning it if it is burn-on-read.
    pub async fn consume(
        &self,
        id: &str,
        user_agent: Option<&str>,
    ) -> Result<SecretEnvelope, LifecycleError> {
        match bot::classify(user_agent) {
            Classification::Interactive => {}
            Classification::Missing => {
                info!("refused secret fetch without user agent");
                return Err(LifecycleError::NotFound);
            }
            Classification::Automated(signature) => {
                info!(signature, "refused secret fetch from automated client");
                return Err(LifecycleError::NotFound);
            }
        }

        if !id::is_well_formed(id) {
            debug!("malformed secret id");
            return Err(LifecycleError::NotFound);
        }

        let record = match self.bounded(self.store.get(id)).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(id, "secret not found or expired");
                return Err(LifecycleError::NotFound);
            }
            Err(e) => {
                warn!(id, op = "get", error = %e, "secret lookup failed");
                return Err(LifecycleError::Transient);
            }
        };

        if !record.burn_on_read {
            return Ok(record.into_envelope());
        }

        match self.bounded(self.store.get_and_delete(id)).await {
            Ok(Some(burned)) => {
                info!(id, "secret burned after read");
                Ok(burned.into_envelope())
            }
            Ok(None) => {
                debug!(id, "secret consumed or expired before burn");
                Err(LifecycleError::NotFound)
            }
            Err(e) => {
                error!(id, op = "get_and_delete", error = %e, "burn failed");
                self.probe_after_failed_burn(id).await;
                Err(LifecycleError::Transient)
            }
        }
    }

    fn validate(
        &self,
        req: CreateSecretRequest,
    ) -> Result<(SecretRecord, Duration), LifecycleError> {
        let CreateSecretRequest {
            encrypted_text,
            iv,
            ttl,
            burn_on_read,
        } = req;

        let encrypted_text = encrypted_text.filter(|s| !s.is_empty());
        let iv = iv.filter(|s| !s.is_empty());

        let mut missing = Vec::new();
        if encrypted_text.is_none() {
            missing.push("encryptedText");
        }
        if iv.is_none() {
            missing.push("iv");
        }
        if ttl.is_none() {
            missing.push("ttl");
        }
        if burn_on_read.is_none() {
            missing.push("burnOnRead");
        }

        let (Some(encrypted_text), Some(iv), Some(ttl), Some(burn_on_read)) =
            (encrypted_text, iv, ttl, burn_on_read)
        else {
            return Err(LifecycleError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        let max = self.max_ttl.as_secs();
        let ttl = u64::try_from(ttl)
            .ok()
            .filter(|&t| t > 0 && t <= max)
            .ok_or_else(|| {
                LifecycleError::Validation(format!("ttl must be between 1 and {max} seconds"))
            })?;

        let record = SecretRecord {
            encrypted_text,
            iv,
            burn_on_read,
        };
        Ok((record, Duration::from_secs(ttl)))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.store_timeout)))
    }

    /// Non-destructive look after a failed burn, for the logs only.
    async fn probe_after_failed_burn(&self, id: &str) {
        match self.bounded(self.store.get(id)).await {
            Ok(Some(_)) => warn!(id, "burn failed; secret still present"),
            Ok(None) => warn!(id, "burn outcome ambiguous; secret no longer present"),
            Err(e) => warn!(id, error = %e, "burn outcome unknown; probe failed"),
        }
    }
}
