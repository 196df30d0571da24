//! genvlab daemon
//!
//! Reference directory service holding devices, environments and kernel
//! bindings in memory.

use anyhow::Context;
use clap::Parser;
use genvlab_api::{create_router, Registry};
use genvlab_core::{DaemonConfig, Device};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// genvlabd - GPU environment directory for notebook kernels
#[derive(Parser, Debug)]
#[command(name = "genvlabd")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file seeding devices, environments and bindings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the API server
    #[arg(long)]
    address: Option<String>,

    /// Port for the REST API server
    #[arg(long)]
    port: Option<u16>,

    /// Number of available devices when the config lists none
    #[arg(long)]
    devices: Option<usize>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DaemonConfig::from_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(count) = args.devices {
        if config.devices.is_empty() {
            config.devices = vec![Device::available(); count];
        }
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.logging.level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting genvlab daemon v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(Registry::from_config(&config));
    let router = create_router(registry, &config.namespace);

    let addr: SocketAddr = format!("{}:{}", config.address, config.port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", config.address, config.port))?;

    info!("API server listening on {}/{}", addr, config.namespace);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}
