//! Studio (nova-st) library
//!
//! Front end for the novel-to-animation pipeline: accepts a novel upload,
//! forwards it to the processing backend, mirrors the backend's status
//! stream onto a node diagram and keeps the generated-book library listing.

pub mod api;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod studio;

pub use error::{Error, Result};
