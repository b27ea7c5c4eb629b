//! `burnlink` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Open the configured store and spawn its expiry sweep.
//! 4. Build the lifecycle and the Axum router.
//! 5. Serve until SIGTERM / Ctrl-C, then flush telemetry.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use burnlink_server::{
    config::{Config, StoreBackend},
    lifecycle::SecretLifecycle,
    server::{self, router, state::AppState},
    store::{DurableStore, MemoryStore, SecretStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        backend = ?cfg.store_backend,
        max_ttl_secs = cfg.max_ttl_secs,
        "burnlink starting"
    );

    // -----------------------------------------------------------------------
    // 3. Store
    // -----------------------------------------------------------------------
    let store: Arc<dyn SecretStore> = match cfg.store_backend {
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            let _sweep = store.clone().spawn_sweep(cfg.sweep_interval());
            Arc::new(store)
        }
        StoreBackend::Durable => {
            let store = DurableStore::open(Path::new(&cfg.data_path))
                .with_context(|| format!("failed to open store at {}", cfg.data_path))?;
            let _sweep = store.clone().spawn_sweep(cfg.sweep_interval());
            Arc::new(store)
        }
    };

    // -----------------------------------------------------------------------
    // 4. Lifecycle + router
    // -----------------------------------------------------------------------
    let lifecycle = SecretLifecycle::new(store, cfg.max_ttl(), cfg.store_timeout());
    let router = router::build(AppState::new(lifecycle));

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("server error")?;

    info!("burnlink stopped");
    telemetry::shutdown();
    Ok(())
}
