//! Farecast fare estimation server

use anyhow::{Context, Result};
use clap::Parser;
use farecast_core::load_model;
use farecast_server::{start_server, AppState, ServerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fare-server")]
#[command(about = "Flight fare estimation service")]
#[command(version)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Model artifact (.json or compressed)
    #[arg(short, long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))?;

    let cli = Cli::parse();

    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(model) = cli.model {
        config.model_path = model;
    }

    info!("Farecast Server v{}", env!("CARGO_PKG_VERSION"));
    let model = load_model(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;
    info!(
        "Model ready: {} trees, {} features",
        model.num_trees(),
        model.num_features()
    );

    start_server(AppState::new(model), &config.bind_addr()).await
}
