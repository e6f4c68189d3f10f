//! Event types for the NOVA event system
//!
//! Both services broadcast `type`-tagged JSON events over SSE. The studio
//! additionally consumes `StatusEvent` payloads pushed by the processing
//! pipeline.

use crate::models::Scene;
use serde::{Deserialize, Serialize};

/// Named SSE event
///
/// Supplies the `event:` field when a broadcast event is written to an SSE
/// stream.
pub trait EventName {
    fn event_name(&self) -> &'static str;
}

// ============================================================================
// Pipeline status stream (consumed from the external processing backend)
// ============================================================================

/// Processing stage reported by the pipeline status stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Splitting,
    Scripting,
    Designing,
    Generating,
    Editing,
    Finalizing,
    Completed,
    Error,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Splitting => "splitting",
            StageName::Scripting => "scripting",
            StageName::Designing => "designing",
            StageName::Generating => "generating",
            StageName::Editing => "editing",
            StageName::Finalizing => "finalizing",
            StageName::Completed => "completed",
            StageName::Error => "error",
        }
    }
}

/// One event from the pipeline status stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEvent {
    pub stage: StageName,
    pub progress: f32,
    pub message: String,
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
}

// ============================================================================
// Player events (nova-sp)
// ============================================================================

/// Read-only snapshot of the playback state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub chapter_index: usize,
    pub scene_index: usize,
    pub chapter_count: usize,
    /// Scene count of the current chapter
    pub scene_count: usize,
    pub is_playing: bool,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub progress_percent: f64,
}

/// Events broadcast by the scene player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// A document finished loading and the cursor was reset to (0,0)
    DocumentLoaded {
        book: String,
        chapter_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Document load or validation failed; the UI shows the retry view
    DocumentLoadFailed {
        book: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Any flag or cursor change; carries the full snapshot
    StateChanged {
        snapshot: PlayerSnapshot,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Cursor moved to a different scene
    SceneChanged {
        scene: Scene,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress tick during playback
    PlaybackProgress {
        chapter_index: usize,
        scene_index: usize,
        progress_percent: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Last scene of the last chapter ran to completion
    PlaybackFinished {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport controls shown or auto-hidden
    ControlsVisibility {
        visible: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl EventName for PlayerEvent {
    fn event_name(&self) -> &'static str {
        match self {
            PlayerEvent::DocumentLoaded { .. } => "DocumentLoaded",
            PlayerEvent::DocumentLoadFailed { .. } => "DocumentLoadFailed",
            PlayerEvent::StateChanged { .. } => "StateChanged",
            PlayerEvent::SceneChanged { .. } => "SceneChanged",
            PlayerEvent::PlaybackProgress { .. } => "PlaybackProgress",
            PlayerEvent::PlaybackFinished { .. } => "PlaybackFinished",
            PlayerEvent::ControlsVisibility { .. } => "ControlsVisibility",
        }
    }
}

// ============================================================================
// Studio events (nova-st)
// ============================================================================

/// Visual status of one pipeline graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Inactive,
    Active,
    Completed,
}

/// Wire form of a graph node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeState {
    pub id: String,
    pub label: String,
    pub status: NodeStatus,
}

/// Wire form of a graph edge; `active` mirrors the source node's status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeState {
    pub source: String,
    pub target: String,
    pub active: bool,
}

/// Events broadcast by the studio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StudioEvent {
    /// A novel upload was accepted and forwarded to the pipeline
    UploadAccepted {
        session_id: uuid::Uuid,
        file_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mirrored pipeline status event
    PipelineStatus {
        stage: StageName,
        progress: f32,
        message: String,
        is_complete: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Node/edge highlight state changed
    GraphChanged {
        nodes: Vec<NodeState>,
        edges: Vec<EdgeState>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pipeline reported an error stage; shown as a dismissible banner
    PipelineFailed {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Library listing was refreshed
    LibraryUpdated {
        count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl EventName for StudioEvent {
    fn event_name(&self) -> &'static str {
        match self {
            StudioEvent::UploadAccepted { .. } => "UploadAccepted",
            StudioEvent::PipelineStatus { .. } => "PipelineStatus",
            StudioEvent::GraphChanged { .. } => "GraphChanged",
            StudioEvent::PipelineFailed { .. } => "PipelineFailed",
            StudioEvent::LibraryUpdated { .. } => "LibraryUpdated",
        }
    }
}
