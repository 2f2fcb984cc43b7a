//! Life service binary.
//!
//! Wires the board store, the simulation core, and the HTTP API together
//! and serves until a shutdown signal arrives.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `life-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured board store, running migrations if asked
//! 4. Build the board service with a shared cancellation flag
//! 5. Serve the board API until Ctrl-C or SIGTERM
//! 6. Close the store

mod error;

use std::path::Path;
use std::sync::Arc;

use life_api::{AppState, ServerConfig};
use life_core::config::LogFormat;
use life_core::{BoardService, CancellationFlag, LifeConfig};
use life_db::BoardStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "life-config.yaml";

/// Application entry point for the Life server.
///
/// # Errors
///
/// Returns an error if configuration, storage, or the HTTP server fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!(
        source,
        host = config.server.host,
        port = config.server.port,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    // 3. Open the board store.
    let store = BoardStore::connect(&config.storage).await?;
    info!(backend = store.name(), "Board store ready");

    // 4. Build the service.
    let cancel = CancellationFlag::new();
    let service = BoardService::new(store.clone(), config.simulation.default_max_iterations)
        .with_cancellation(cancel.clone());
    info!(
        default_max_iterations = service.default_max_iterations().get(),
        "Board service ready"
    );
    let state = Arc::new(AppState::new(service));

    // 5. Serve.
    let server_config = ServerConfig::from(&config.server);
    let served = life_api::start_server(&server_config, state, shutdown_signal(cancel)).await;

    // 6. Release the store even if serving failed.
    store.close().await;
    served?;

    info!("life-server stopped");
    Ok(())
}

/// Load `life-config.yaml`, falling back to defaults when it is absent.
///
/// Environment overrides apply in both cases. Returns the config and a
/// label naming where it came from, for the startup log.
fn load_config() -> Result<(LifeConfig, &'static str), ServerError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((LifeConfig::from_file(config_path)?, CONFIG_PATH))
    } else {
        let mut config = LifeConfig::default();
        config.apply_env_overrides()?;
        Ok((config, "defaults"))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(config: &LifeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Resolve on Ctrl-C or SIGTERM and cancel in-flight advancements.
async fn shutdown_signal(cancel: CancellationFlag) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, cancelling in-flight advancements");
    cancel.cancel();
}
