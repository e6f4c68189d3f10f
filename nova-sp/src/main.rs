//! Scene Player (nova-sp) - Main entry point
//!
//! HTTP/SSE service that loads generated scene documents and plays them
//! back chapter by chapter with a fixed one-second progress tick.

use anyhow::{Context, Result};
use clap::Parser;
use nova_sp::api::{self, AppContext};
use nova_sp::loader::DocumentLoader;
use nova_sp::player::PlayerEngine;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nova-sp
#[derive(Parser, Debug)]
#[command(name = "nova-sp")]
#[command(about = "Scene Player service for NOVA")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5760", env = "NOVA_SP_PORT")]
    port: u16,

    /// Base URL of the published asset store
    #[arg(long)]
    assets_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nova_sp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let assets_url = nova_common::config::resolve_endpoint(
        args.assets_url.as_deref(),
        "NOVA_ASSETS_URL",
        "assets_url",
        nova_common::config::DEFAULT_ASSETS_URL,
    );

    info!("Starting NOVA Scene Player on port {}", args.port);
    info!("Asset store: {}", assets_url);

    let engine = PlayerEngine::new(DocumentLoader::new(assets_url));
    let ctx = AppContext { engine };

    api::run(args.port, ctx)
        .await
        .context("HTTP server error")?;

    Ok(())
}
