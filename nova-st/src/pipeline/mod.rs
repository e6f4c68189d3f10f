//! Pipeline mirroring: the node diagram and the status stream consumer

pub mod graph;
pub mod monitor;

pub use graph::{GraphLayout, PipelineGraph};
