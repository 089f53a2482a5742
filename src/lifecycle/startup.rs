//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse arguments and load configuration
//! - Initialize subsystems in dependency order
//! - Start background tasks (connection manager, liveness monitor)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast on configuration and bind errors
//! - The store is never a startup dependency: its absence is a runtime state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use crate::config::{load_config, AppConfig, ConfigError};
use crate::connection::{ConnectionManager, StoreHandle};
use crate::health::LivenessMonitor;
use crate::http::HttpServer;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::store::MySqlConnector;

/// How long background tasks get to notice shutdown once the server stops.
const TASK_GRACE: Duration = Duration::from_secs(5);

/// Command-line arguments for the API server.
#[derive(Debug, Parser)]
#[command(name = "movieflix-api", version, about = "Movie catalogue and ratings API")]
pub struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "MOVIEFLIX_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service to completion.
pub async fn run(args: Args) -> Result<(), StartupError> {
    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.server.bind_address,
        database = ?config.database,
        "movieflix-api starting"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses when metrics are on.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    serve(config).await
}

async fn serve(config: AppConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    let handle = StoreHandle::new();

    let manager = ConnectionManager::new(
        Arc::new(MySqlConnector::new(config.database.clone())),
        handle.clone(),
        config.reconnect.clone(),
    )
    .spawn(shutdown.subscribe());

    let monitor = tokio::spawn(
        LivenessMonitor::new(handle.clone(), config.health.clone()).run(shutdown.subscribe()),
    );

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.server.bind_address.clone(),
            source,
        })?;

    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, handle);
    let served = server.run(listener, shutdown.subscribe()).await;

    // The server may also stop on its own (accept error); make sure the
    // background tasks follow.
    shutdown.trigger();
    if tokio::time::timeout(TASK_GRACE, async {
        let _ = manager.await;
        let _ = monitor.await;
    })
    .await
    .is_err()
    {
        tracing::warn!("Background tasks did not stop within the grace period");
    }

    served.map_err(StartupError::Serve)?;
    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_accept_config_path() {
        let args = Args::parse_from(["movieflix-api", "--config", "movieflix.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("movieflix.toml")));
    }
}
