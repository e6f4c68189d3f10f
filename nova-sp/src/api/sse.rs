//! Server-Sent Events (SSE) endpoint
//!
//! Streams player events to connected UI clients.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE stream of player events
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    nova_common::sse::broadcast_event_stream(ctx.engine.subscribe())
}
