//! Scene Player (nova-sp) library
//!
//! Plays back AI-generated scene documents chapter by chapter: a validated
//! document loader, a pure playback state machine with a one-second timing
//! driver, a keyboard control surface and an HTTP/SSE API with an embedded
//! browser UI.

pub mod api;
pub mod error;
pub mod loader;
pub mod player;

pub use error::{Error, Result};
