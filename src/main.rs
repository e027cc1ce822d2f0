//! Package registry gateway.
//!
//! Sits in front of a legacy registry application and answers the read side
//! of the registry protocol itself.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────┐
//!                          │                   GATEWAY                     │
//!     Client Request       │  ┌─────────┐    ┌──────────────┐              │
//!     ─────────────────────┼─▶│  http   │───▶│   routing    │              │
//!                          │  │ server  │    │ first match  │              │
//!                          │  └─────────┘    └──────┬───────┘              │
//!                          │         ┌──────────────┼───────────────┐      │
//!                          │         ▼              ▼               ▼      │
//!                          │  ┌───────────┐  ┌────────────┐  ┌──────────┐  │
//!                          │  │  migrate  │  │  registry  │  │ forward  │──┼──▶ Local app
//!                          │  │ 308 / 200 │  │  resolver  │  │  relay   │  │
//!                          │  └───────────┘  └─────┬──────┘  └──────────┘  │
//!                          │                 ┌─────┴─────┐                 │
//!                          │                 ▼           ▼                 │
//!                          │           PostgreSQL    memcached             │
//!                          └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use registry_gateway::config::load_config;
use registry_gateway::lifecycle::startup;
use registry_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "registry-gateway")]
#[command(about = "Read-side gateway for the package registry", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        delegate = %config.delegate.address,
        upstream = %config.registry.upstream_origin,
        "registry-gateway v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
