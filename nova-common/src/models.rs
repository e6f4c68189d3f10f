//! Data models shared across NOVA services
//!
//! Wire field names follow the document format produced by the processing
//! pipeline (camelCase), so these types deserialize the published JSON
//! directly.

use serde::{Deserialize, Serialize};

/// A single scene within a chapter
///
/// `chapter_index` / `scene_index` are positional caches; the loader rewrites
/// them to post-validation positions so they always agree with the containing
/// document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub chapter_index: usize,
    pub scene_index: usize,
    pub title: String,
    pub description: String,
    pub image_url: String,
    /// Optional narration audio; scenes without audio play silently
    pub audio_url: Option<String>,
    /// Opaque per-scene style payload, injected for the scene's lifetime only
    pub animation_code: Option<String>,
    /// Scene length in seconds, always > 0 after validation
    pub duration: f64,
}

/// A chapter: an ordered, non-empty (after validation) sequence of scenes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub scenes: Vec<Scene>,
}

impl Chapter {
    /// Number of scenes in this chapter
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }
}

/// An entry in the generated-book library listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookEntry {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}
