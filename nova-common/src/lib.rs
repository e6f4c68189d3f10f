//! Shared library for the NOVA services
//!
//! Common data models, event types, configuration resolution and SSE
//! utilities used by the scene player (nova-sp) and the studio (nova-st).

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;

pub use error::{Error, Result};
