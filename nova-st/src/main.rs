//! Studio (nova-st) - Main entry point
//!
//! HTTP/SSE service that forwards novel uploads to the processing pipeline,
//! mirrors the pipeline status stream onto a node diagram and serves the
//! generated-book library.

use anyhow::{Context, Result};
use clap::Parser;
use nova_st::api::{self, AppContext};
use nova_st::studio::StudioEngine;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nova-st
#[derive(Parser, Debug)]
#[command(name = "nova-st")]
#[command(about = "Studio service for NOVA")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5761", env = "NOVA_ST_PORT")]
    port: u16,

    /// Base URL of the processing pipeline
    #[arg(long)]
    pipeline_url: Option<String>,

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
                .unwrap_or_else(|_| "nova_st=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let pipeline_url = nova_common::config::resolve_endpoint(
        args.pipeline_url.as_deref(),
        "NOVA_PIPELINE_URL",
        "pipeline_url",
        nova_common::config::DEFAULT_PIPELINE_URL,
    );
    let assets_url = nova_common::config::resolve_endpoint(
        args.assets_url.as_deref(),
        "NOVA_ASSETS_URL",
        "assets_url",
        nova_common::config::DEFAULT_ASSETS_URL,
    );

    info!("Starting NOVA Studio on port {}", args.port);
    info!("Pipeline: {}", pipeline_url);
    info!("Asset store: {}", assets_url);

    let engine = StudioEngine::new(pipeline_url, assets_url);

    // Show the bookshelf from the start
    engine.refresh_library().await;

    let ctx = AppContext { engine };

    api::run(args.port, ctx)
        .await
        .context("HTTP server error")?;

    Ok(())
}
