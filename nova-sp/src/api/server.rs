//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for playback control, SSE and
//! the embedded player UI.

use crate::error::{Error, Result};
use crate::player::PlayerEngine;
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
    pub engine: PlayerEngine,
}

/// Build the player router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Player UI (embedded HTML; reads the ?book= deep link client-side)
        .route(
            "/",
            get(|| async { axum::response::Html(include_str!("player_ui.html")) }),
        )
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Document lifecycle
        .route("/player/load", post(super::handlers::load_document))
        .route("/player/state", get(super::handlers::get_state))
        // Transport control
        .route("/player/toggle-play", post(super::handlers::toggle_play))
        .route("/player/next", post(super::handlers::next_scene))
        .route("/player/previous", post(super::handlers::prev_scene))
        .route(
            "/player/jump/chapter/:index",
            post(super::handlers::jump_to_chapter),
        )
        .route(
            "/player/jump/scene/:index",
            post(super::handlers::jump_to_scene),
        )
        .route("/player/toggle-mute", post(super::handlers::toggle_mute))
        .route(
            "/player/toggle-fullscreen",
            post(super::handlers::toggle_fullscreen),
        )
        .route(
            "/player/exit-fullscreen",
            post(super::handlers::exit_fullscreen),
        )
        // Input surface
        .route("/player/key", post(super::handlers::key_input))
        .route("/player/activity", post(super::handlers::pointer_activity))
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
