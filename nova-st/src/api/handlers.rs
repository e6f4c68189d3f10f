//! HTTP request handlers
//!
//! REST endpoints for novel upload, the pipeline diagram and the library.

use crate::api::server::AppContext;
use crate::error::Error;
use crate::pipeline::GraphLayout;
use crate::studio::GraphSnapshot;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use nova_common::models::BookEntry;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

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

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub layout: GraphLayout,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

fn bad_request(message: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(StatusResponse {
            status: message.to_string(),
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
        module: "studio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Upload Endpoint
// ============================================================================

/// POST /upload - Accept a plain-text novel and forward it to the pipeline
pub async fn upload(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HandlerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("novel.txt").to_string();
        if !file_name.to_lowercase().ends_with(".txt") {
            return Err(bad_request("only .txt novels are accepted"));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("upload read failed: {}", e)))?
            .to_vec();
        if data.is_empty() {
            return Err(bad_request("uploaded file is empty"));
        }

        info!("Upload received: {} ({} bytes)", file_name, data.len());
        return match ctx.engine.upload(file_name, data).await {
            Ok(session_id) => Ok(Json(UploadResponse { session_id })),
            Err(e @ Error::Upstream(_)) => Err((
                StatusCode::BAD_GATEWAY,
                Json(StatusResponse {
                    status: e.to_string(),
                }),
            )),
            Err(e) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: e.to_string(),
                }),
            )),
        };
    }
    Err(bad_request("missing file field"))
}

// ============================================================================
// Pipeline Endpoint
// ============================================================================

/// GET /pipeline/graph - Current node diagram snapshot
///
/// `?layout=showcase` selects the richer layout with the tool nodes; the
/// default is the upload view.
pub async fn pipeline_graph(
    State(ctx): State<AppContext>,
    Query(query): Query<GraphQuery>,
) -> Json<GraphSnapshot> {
    Json(ctx.engine.graph_snapshot(query.layout).await)
}

// ============================================================================
// Library Endpoints
// ============================================================================

/// GET /library - Known generated books
pub async fn library(State(ctx): State<AppContext>) -> Json<Vec<BookEntry>> {
    Json(ctx.engine.library().await)
}

/// POST /library/refresh - Re-fetch the published listing and merge it
pub async fn refresh_library(State(ctx): State<AppContext>) -> Json<Vec<BookEntry>> {
    ctx.engine.refresh_library().await;
    Json(ctx.engine.library().await)
}
