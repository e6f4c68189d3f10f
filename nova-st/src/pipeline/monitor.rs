//! Pipeline status stream consumer
//!
//! Subscribes to the backend's SSE status endpoint for the active session
//! and feeds decoded events into the engine. The studio never writes back;
//! on `isComplete` the stream is closed and the library listing refreshed.

use crate::studio::StudioEngine;
use futures::StreamExt;
use nova_common::events::StatusEvent;
use nova_common::sse::SseFrameDecoder;
use tracing::{info, warn};

/// Mirror the pipeline status stream until it completes or drops
pub async fn mirror_status_stream(engine: StudioEngine) {
    let url = format!("{}/processing-status", engine.pipeline_url());
    info!("Subscribing to pipeline status stream: {}", url);

    let response = match engine.client().get(&url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!("Status stream returned {}", r.status());
            engine
                .pipeline_failed("processing status is unavailable")
                .await;
            return;
        }
        Err(e) => {
            warn!("Status stream connection failed: {}", e);
            engine
                .pipeline_failed("processing status is unavailable")
                .await;
            return;
        }
    };

    let mut decoder = SseFrameDecoder::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                warn!("Status stream read error: {}", e);
                break;
            }
        };

        // Chunks need not align with event, line or UTF-8 boundaries
        for payload in decoder.feed(&chunk) {
            let event: StatusEvent = match serde_json::from_str(&payload) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping unparseable status payload: {}", e);
                    continue;
                }
            };
            let complete = event.is_complete;
            engine.apply_status(event).await;
            if complete {
                info!("Pipeline session complete, refreshing library");
                engine.refresh_library().await;
                return;
            }
        }
    }
    info!("Status stream ended");
}
