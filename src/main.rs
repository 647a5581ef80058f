//! Skill-sharing talk board server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum (trace, request id, timeout, body limit)
//!                          │
//!                          ▼
//!                     routing::Router ──no match──▶ static files (ServeDir)
//!                          │
//!              ┌───────────┴───────────┐
//!              ▼                       ▼
//!        store::TalkBoard         store::Glossary ──▶ glossary.json
//!              │                                      (single writer task)
//!              ▼
//!        notify::ChangeNotifier ──▶ long-polling GET /talks
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use skillshare::config::validation::validate_config;
use skillshare::config::{load_config, ConfigError, ServerConfig};
use skillshare::observability::{logging, metrics};
use skillshare::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "skillshare")]
#[command(about = "Skill-sharing talk board server", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 127.0.0.1:8000
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(args: &Args) -> Result<ServerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "skillshare starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        glossary_path = %config.storage.glossary_path,
        static_root = %config.static_files.root,
        max_wait_secs = config.long_poll.max_wait_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
