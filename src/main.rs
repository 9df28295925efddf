//! Edge gatekeeper.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 GATEKEEPER                   │
//!                         │                                              │
//!     Client Request      │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!     ────────────────────┼─▶│   net   │──▶│  http   │──▶│ gatekeeper │  │
//!                         │  │  tls    │   │ server  │   │ TLS, GET   │  │
//!                         │  └─────────┘   └─────────┘   └─────┬──────┘  │
//!                         │                                    │         │
//!                         │                                    ▼         │
//!     Client Response     │                              ┌────────────┐  │
//!     ◀───────────────────┼──────────────────────────────│   assets   │◀─┼── files / origin
//!                         │                              └────────────┘  │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gatekeeper::config::{load_config, GatekeeperConfig};
use edge_gatekeeper::lifecycle::{shutdown_signal, Shutdown};
use edge_gatekeeper::net::tls::install_crypto_provider;
use edge_gatekeeper::observability::{logging, metrics};
use edge_gatekeeper::{build_store, GatekeeperServer};

#[derive(Parser)]
#[command(name = "edge-gatekeeper", version, about = "Admit GET requests over TLS 1.2+ and serve assets")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatekeeperConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    install_crypto_provider();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gatekeeper starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = build_store(&config.assets, &config.timeouts)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    GatekeeperServer::new(config, store).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
