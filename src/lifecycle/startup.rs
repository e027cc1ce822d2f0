//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect the metadata store and list cache
//! - Launch the delegate process when configured
//! - Bind the listener and serve until shutdown or delegate failure
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, no retry
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, DelegateProcess, Shutdown};
use crate::observability::metrics;
use crate::registry::{MemcacheListCache, PgPackageStore};

/// Bring the gateway up and serve until a termination signal.
pub async fn run(config: GatewayConfig) -> Result<(), GatewayError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let cache = MemcacheListCache::connect(&config.cache).await?;
    let store = PgPackageStore::connect(&config.store).await?;
    let delegate = DelegateProcess::spawn(&config.delegate)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Arc::new(store), Arc::new(cache))?;

    let shutdown = Shutdown::new();
    let serving = server.run(listener, shutdown.subscribe());
    tokio::pin!(serving);

    let delegate_failure = async move {
        match delegate {
            Some(process) => process.supervise().await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = &mut serving => return result.map_err(Into::into),
        err = delegate_failure => {
            tracing::error!(error = %err, "Delegate process failed");
            return Err(err.into());
        }
        _ = signals::wait_for_signal() => shutdown.trigger(),
    }

    // Drain in-flight requests
    serving.await?;
    Ok(())
}
