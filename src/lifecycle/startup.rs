//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the shared store and start following outside writes
//! - Initialize the metrics endpoint when enabled
//! - Build the gateway and bind its listener
//! - Serve until a shutdown signal arrives

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::RedirectorConfig;
use crate::http::GatewayServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::store::{FileStore, StoreWatcher};

/// Run the redirect gateway to completion.
pub async fn run(config: RedirectorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileStore::open(&config.store.path)?);
    tracing::info!(path = %config.store.path, "Store opened");

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = if config.store.watch {
        let watcher = StoreWatcher::new(
            store.clone(),
            Duration::from_secs(config.store.poll_interval_secs),
        );
        Some(watcher.run()?)
    } else {
        None
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = GatewayServer::new(&config, store);
    let listener = TcpListener::bind(&config.gateway.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
