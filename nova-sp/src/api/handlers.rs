//! HTTP request handlers
//!
//! REST endpoints for document loading and playback control.

use crate::api::server::AppContext;
use crate::loader::LoadError;
use crate::player::PlayerOverview;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use nova_common::events::PlayerSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub book: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub handled: bool,
    pub suppress_default: bool,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

fn no_document() -> HandlerError {
    (
        StatusCode::CONFLICT,
        Json(StatusResponse {
            status: "no document loaded".to_string(),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "scene_player".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Document Endpoints
// ============================================================================

/// POST /player/load - Load (or retry) the document for a book
pub async fn load_document(
    State(ctx): State<AppContext>,
    Json(req): Json<LoadRequest>,
) -> Result<Json<PlayerOverview>, HandlerError> {
    info!("Load requested: {}", req.book);
    match ctx.engine.load(&req.book).await {
        Ok(_) => Ok(Json(ctx.engine.overview().await)),
        Err(e) => {
            let status = match e {
                LoadError::Transport(_) => StatusCode::BAD_GATEWAY,
                LoadError::EmptyOrMalformed
                | LoadError::NoValidChapters
                | LoadError::NoValidScenes => StatusCode::UNPROCESSABLE_ENTITY,
            };
            Err((
                status,
                Json(StatusResponse {
                    status: e.to_string(),
                }),
            ))
        }
    }
}

/// GET /player/state - Current player overview
pub async fn get_state(State(ctx): State<AppContext>) -> Json<PlayerOverview> {
    Json(ctx.engine.overview().await)
}

// ============================================================================
// Transport Endpoints
// ============================================================================

/// POST /player/toggle-play
pub async fn toggle_play(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine.toggle_play().await.map(Json).ok_or_else(no_document)
}

/// POST /player/next
pub async fn next_scene(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine.next_scene().await.map(Json).ok_or_else(no_document)
}

/// POST /player/previous
pub async fn prev_scene(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine.prev_scene().await.map(Json).ok_or_else(no_document)
}

/// POST /player/jump/chapter/:index
pub async fn jump_to_chapter(
    State(ctx): State<AppContext>,
    Path(index): Path<usize>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine
        .jump_to_chapter(index)
        .await
        .map(Json)
        .ok_or_else(no_document)
}

/// POST /player/jump/scene/:index
pub async fn jump_to_scene(
    State(ctx): State<AppContext>,
    Path(index): Path<usize>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine
        .jump_to_scene(index)
        .await
        .map(Json)
        .ok_or_else(no_document)
}

/// POST /player/toggle-mute
pub async fn toggle_mute(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine.toggle_mute().await.map(Json).ok_or_else(no_document)
}

/// POST /player/toggle-fullscreen
pub async fn toggle_fullscreen(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine
        .toggle_fullscreen()
        .await
        .map(Json)
        .ok_or_else(no_document)
}

/// POST /player/exit-fullscreen
pub async fn exit_fullscreen(
    State(ctx): State<AppContext>,
) -> Result<Json<PlayerSnapshot>, HandlerError> {
    ctx.engine
        .exit_fullscreen()
        .await
        .map(Json)
        .ok_or_else(no_document)
}

// ============================================================================
// Input Endpoints
// ============================================================================

/// POST /player/key - Apply the command bound to a keyboard code
pub async fn key_input(
    State(ctx): State<AppContext>,
    Json(req): Json<KeyRequest>,
) -> Json<KeyResponse> {
    match ctx.engine.handle_key(&req.code).await {
        Some(command) => Json(KeyResponse {
            handled: true,
            suppress_default: command.suppresses_default(),
        }),
        None => Json(KeyResponse {
            handled: false,
            suppress_default: false,
        }),
    }
}

/// POST /player/activity - Pointer activity ping; keeps controls visible
pub async fn pointer_activity(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    ctx.engine.pointer_activity();
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}
