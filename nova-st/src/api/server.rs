//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for upload, pipeline mirroring,
//! the library and the embedded studio UI.

use crate::error::{Error, Result};
use crate::studio::StudioEngine;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub engine: StudioEngine,
}

/// Build the studio router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Studio UI (embedded HTML)
        .route(
            "/",
            get(|| async { axum::response::Html(include_str!("studio_ui.html")) }),
        )
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Novel upload (forwarded to the pipeline)
        .route("/upload", post(super::handlers::upload))
        // Pipeline diagram snapshot
        .route("/pipeline/graph", get(super::handlers::pipeline_graph))
        // Generated-book library
        .route("/library", get(super::handlers::library))
        .route("/library/refresh", post(super::handlers::refresh_library))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until a shutdown signal arrives
pub async fn run(port: u16, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
