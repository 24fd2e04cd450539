use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::media::CloudinaryStore;
use server::{AppState, database, serve};
use shared::config::load_config;

#[derive(Parser, Debug)]
#[command(name = "server", about = "Storefront HTTP backend")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml", env = "STOREFRONT_CONFIG")]
    config: String,

    /// Override `[server] bind`
    #[arg(long)]
    bind: Option<String>,

    /// Override `[server] port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let db = database::connect(&config.database)
        .await
        .context("Failed to open database")?;
    database::create_tables(&db)
        .await
        .context("Failed to create tables")?;

    let media = Arc::new(CloudinaryStore::new(&config.media));
    let addr = config.server.addr();
    let state = AppState::new(config, db, media)?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    serve(listener, state).await?;
    info!("Server stopped");

    Ok(())
}
