//! Configuration loading and validation for the burnlink service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Which [`crate::store::SecretStore`] backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map; secrets are lost on restart.
    Memory,
    /// redb file at [`Config::data_path`].
    Durable,
}

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint. Spans are exported only when this is set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Longest TTL a secret may be created with, in seconds.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_secs: u64,

    /// Bound on each individual store call, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,

    /// Storage backend.
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Database file used by the durable backend.
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// How often (seconds) the backend prunes expired entries.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_listen_port() -> u16 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_max_ttl() -> u64 {
    2_592_000
}
fn default_store_timeout() -> u64 {
    2000
}
fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}
fn default_data_path() -> String {
    "burnlink.redb".into()
}
fn default_sweep_interval() -> u64 {
    60
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// TTL ceiling as a [`Duration`].
    pub fn max_ttl(&self) -> Duration {
        Duration::from_secs(self.max_ttl_secs)
    }

    /// Store call bound as a [`Duration`].
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Sweep period as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.max_ttl_secs == 0 {
            anyhow::bail!("MAX_TTL_SECS must be > 0");
        }
        if self.store_timeout_ms == 0 {
            anyhow::bail!("STORE_TIMEOUT_MS must be > 0");
        }
        if self.sweep_interval_secs == 0 {
            anyhow::bail!("SWEEP_INTERVAL_SECS must be > 0");
        }
        if self.store_backend == StoreBackend::Durable && self.data_path.trim().is_empty() {
            anyhow::bail!("DATA_PATH is required when STORE_BACKEND=durable");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be empty when set");
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
            max_ttl_secs: default_max_ttl(),
            store_timeout_ms: default_store_timeout(),
            store_backend: default_store_backend(),
            data_path: default_data_path(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}
