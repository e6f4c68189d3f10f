//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE plumbing for the NOVA services: the serving side (broadcast
//! channel to `axum` SSE response) and the consuming side (incremental frame
//! decoding of an upstream status stream).

use crate::events::EventName;
use axum::response::sse::{Event, Sse};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

/// Wrap a broadcast receiver into an SSE response
///
/// Each event is serialized to JSON and named via [`EventName`] so clients
/// can subscribe per event type. Serialization failures and lagged receivers
/// are logged and skipped; the stream itself stays open.
pub fn broadcast_event_stream<E>(
    rx: broadcast::Receiver<E>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    E: EventName + Serialize + Clone + Send + 'static,
{
    debug!("New SSE client connected");

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    let event_type = event.event_name();
                    debug!("Broadcasting SSE event: {}", event_type);
                    Some(Ok(Event::default().event(event_type).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // BroadcastStream error (lagged or closed)
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Incremental decoder for a consumed SSE byte stream
///
/// Network chunks do not align with event boundaries, so the decoder buffers
/// raw bytes and yields one string per complete event: the concatenated
/// `data:` lines. Comment lines and `event:`/`id:` fields are skipped.
/// Buffering stays at the byte level because a chunk boundary can split a
/// multibyte UTF-8 sequence or a CRLF pair; text decoding happens only per
/// complete frame.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
    pending_cr: bool,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the stream; returns the data payloads of every event
    /// completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        // Normalize CR and CRLF line endings to LF. A CR at the end of a
        // chunk stays pending until the next byte shows whether it pairs.
        for &byte in chunk {
            if self.pending_cr {
                self.pending_cr = false;
                self.buffer.push(b'\n');
                if byte == b'\n' {
                    continue;
                }
            }
            if byte == b'\r' {
                self.pending_cr = true;
            } else {
                self.buffer.push(byte);
            }
        }

        let mut payloads = Vec::new();
        while let Some(boundary) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..boundary + 2).collect();
            let frame = String::from_utf8_lossy(&frame);
            if let Some(data) = Self::decode_frame(&frame) {
                payloads.push(data);
            }
        }
        payloads
    }

    fn decode_frame(frame: &str) -> Option<String> {
        let mut data_lines = Vec::new();
        for line in frame.lines() {
            if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }
        if data_lines.is_empty() {
            None
        } else {
            Some(data_lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_frame_in_one_chunk() {
        let mut decoder = SseFrameDecoder::new();
        let payloads = decoder.feed(b"data: {\"stage\":\"splitting\"}\n\n");
        assert_eq!(payloads, vec!["{\"stage\":\"splitting\"}"]);
    }

    #[test]
    fn frame_split_across_chunks() {
        let mut decoder = SseFrameDecoder::new();
        assert!(decoder.feed(b"data: {\"sta").is_empty());
        assert!(decoder.feed(b"ge\":\"editing\"}").is_empty());
        let payloads = decoder.feed(b"\n\n");
        assert_eq!(payloads, vec!["{\"stage\":\"editing\"}"]);
    }

    #[test]
    fn comments_and_heartbeats_are_skipped() {
        let mut decoder = SseFrameDecoder::new();
        let payloads = decoder.feed(b": heartbeat\n\ndata: x\n\n");
        assert_eq!(payloads, vec!["x"]);
    }

    #[test]
    fn multiple_frames_per_chunk() {
        let mut decoder = SseFrameDecoder::new();
        let payloads = decoder.feed(b"data: a\n\ndata: b\n\n");
        assert_eq!(payloads, vec!["a", "b"]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseFrameDecoder::new();
        let payloads = decoder.feed(b"data: line1\ndata: line2\n\n");
        assert_eq!(payloads, vec!["line1\nline2"]);
    }

    #[test]
    fn crlf_delimiters_are_normalized() {
        let mut decoder = SseFrameDecoder::new();
        let payloads = decoder.feed(b"data: y\r\n\r\n");
        assert_eq!(payloads, vec!["y"]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let mut decoder = SseFrameDecoder::new();
        let frame = "data: {\"message\":\"第一章\"}\n\n".as_bytes();
        // Split inside the three-byte encoding of the first CJK character
        let (head, tail) = frame.split_at(19);
        assert!(decoder.feed(head).is_empty());
        let payloads = decoder.feed(tail);
        assert_eq!(payloads, vec!["{\"message\":\"第一章\"}"]);
    }

    #[test]
    fn crlf_pair_split_across_chunks() {
        let mut decoder = SseFrameDecoder::new();
        assert!(decoder.feed(b"data: x\r").is_empty());
        let payloads = decoder.feed(b"\n\r\n");
        assert_eq!(payloads, vec!["x"]);
    }
}
