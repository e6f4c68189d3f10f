//! Chapter/scene document loader
//!
//! Fetches the JSON document published for a book, then validates and
//! filters it into the in-memory `Chapter` model. Validation is separated
//! from transport so it can be tested without a network.
//!
//! Retry is caller-initiated: a failed load leaves no partial state and the
//! load endpoint is simply invoked again.

use nova_common::models::{Chapter, Scene};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Document load failures, surfaced to the UI as the full-screen error view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Network failure or non-success HTTP status
    #[error("failed to fetch document: {0}")]
    Transport(String),

    /// Payload is not a non-empty JSON array of chapters
    #[error("document is empty or malformed")]
    EmptyOrMalformed,

    /// Every chapter was rejected by structural filtering
    #[error("document contains no valid chapters")]
    NoValidChapters,

    /// Chapters parsed but every scene was rejected by filtering
    #[error("document contains no valid scenes")]
    NoValidScenes,
}

/// Lenient wire form of a scene: every field optional so one bad scene is
/// dropped instead of failing the whole document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScene {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    animation_code: Option<String>,
    #[serde(default)]
    duration: f64,
}

impl RawScene {
    fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && !self.title.is_empty()
            && !self.description.is_empty()
            && self.duration > 0.0
    }
}

/// Lenient wire form of a chapter
#[derive(Debug, Deserialize)]
struct RawChapter {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    scenes: Vec<RawScene>,
}

impl RawChapter {
    fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty() && !self.scenes.is_empty()
    }
}

/// Parse and validate a raw document body
pub fn parse_document(body: &str) -> Result<Vec<Chapter>, LoadError> {
    let raw: Vec<RawChapter> =
        serde_json::from_str(body).map_err(|_| LoadError::EmptyOrMalformed)?;
    if raw.is_empty() {
        return Err(LoadError::EmptyOrMalformed);
    }
    validate_document(raw)
}

/// Structural filtering per the document contract
///
/// A chapter survives only with a non-empty id, a non-empty title and at
/// least one valid scene; a scene survives only with id, title, description
/// and a positive duration. Positional caches are rewritten to post-filter
/// positions so they always agree with the surviving layout.
fn validate_document(raw: Vec<RawChapter>) -> Result<Vec<Chapter>, LoadError> {
    let structurally_valid: Vec<RawChapter> =
        raw.into_iter().filter(RawChapter::is_valid).collect();
    if structurally_valid.is_empty() {
        return Err(LoadError::NoValidChapters);
    }

    let chapters: Vec<Chapter> = structurally_valid
        .into_iter()
        .map(|chapter| {
            let scenes: Vec<RawScene> = chapter
                .scenes
                .into_iter()
                .filter(|scene| {
                    if !scene.is_valid() {
                        debug!("Dropping invalid scene {:?} in chapter {}", scene.id, chapter.id);
                    }
                    scene.is_valid()
                })
                .collect();
            (chapter.id, chapter.title, scenes)
        })
        .filter(|(_, _, scenes)| !scenes.is_empty())
        .enumerate()
        .map(|(chapter_index, (id, title, scenes))| Chapter {
            id,
            title,
            scenes: scenes
                .into_iter()
                .enumerate()
                .map(|(scene_index, scene)| Scene {
                    id: scene.id,
                    chapter_index,
                    scene_index,
                    title: scene.title,
                    description: scene.description,
                    image_url: scene.image_url,
                    audio_url: scene.audio_url.filter(|url| !url.is_empty()),
                    animation_code: scene.animation_code.filter(|code| !code.is_empty()),
                    duration: scene.duration,
                })
                .collect(),
        })
        .collect();

    if chapters.is_empty() {
        return Err(LoadError::NoValidScenes);
    }
    Ok(chapters)
}

/// Fetches published documents from the asset store
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    client: reqwest::Client,
    assets_base: String,
}

impl DocumentLoader {
    pub fn new(assets_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            assets_base,
        }
    }

    /// Fetch and validate the document for `book`
    ///
    /// `book` is the opaque path from the `?book=` deep link; the caller owns
    /// the returned chapters.
    pub async fn load(&self, book: &str) -> Result<Vec<Chapter>, LoadError> {
        let url = format!("{}/{}", self.assets_base, book);
        debug!("Fetching document: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Document fetch failed: HTTP {}", response.status());
            return Err(LoadError::Transport(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        parse_document(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_valid_document_loads() {
        let body = r#"[{"id":"c1","title":"Ch1","scenes":
            [{"id":"s1","title":"S1","description":"d","duration":5}]}]"#;
        let chapters = parse_document(body).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].scenes.len(), 1);
        assert_eq!(chapters[0].scenes[0].duration, 5.0);
    }

    #[test]
    fn empty_array_is_malformed() {
        assert_eq!(parse_document("[]"), Err(LoadError::EmptyOrMalformed));
    }

    #[test]
    fn non_array_payload_is_malformed() {
        assert_eq!(
            parse_document(r#"{"id":"c1"}"#),
            Err(LoadError::EmptyOrMalformed)
        );
        assert_eq!(parse_document("not json"), Err(LoadError::EmptyOrMalformed));
    }

    #[test]
    fn chapter_without_title_is_dropped() {
        let body = r#"[{"id":"c1","title":"","scenes":
            [{"id":"s1","title":"S1","description":"d","duration":5}]}]"#;
        assert_eq!(parse_document(body), Err(LoadError::NoValidChapters));
    }

    #[test]
    fn zero_duration_scene_fails_with_no_valid_scenes() {
        let body = r#"[{"id":"c1","title":"Ch1","scenes":
            [{"id":"s1","title":"S1","description":"d","duration":0}]}]"#;
        assert_eq!(parse_document(body), Err(LoadError::NoValidScenes));
    }

    #[test]
    fn invalid_scenes_are_filtered_not_fatal() {
        let body = r#"[{"id":"c1","title":"Ch1","scenes":[
            {"id":"s1","title":"S1","description":"d","duration":0},
            {"id":"s2","title":"S2","description":"d","duration":3}
        ]}]"#;
        let chapters = parse_document(body).unwrap();
        assert_eq!(chapters[0].scenes.len(), 1);
        assert_eq!(chapters[0].scenes[0].id, "s2");
    }

    #[test]
    fn positional_caches_are_rewritten_after_filtering() {
        let body = r#"[
            {"id":"c0","title":"","scenes":[{"id":"x","title":"t","description":"d","duration":1}]},
            {"id":"c1","title":"Ch1","scenes":[
                {"id":"s0","title":"bad","description":"","duration":2},
                {"id":"s1","title":"S1","description":"d","duration":2,"chapterIndex":9,"sceneIndex":9}
            ]}
        ]"#;
        let chapters = parse_document(body).unwrap();
        assert_eq!(chapters.len(), 1);
        let scene = &chapters[0].scenes[0];
        assert_eq!(scene.chapter_index, 0);
        assert_eq!(scene.scene_index, 0);
    }

    #[test]
    fn empty_optional_urls_become_none() {
        let body = r#"[{"id":"c1","title":"Ch1","scenes":
            [{"id":"s1","title":"S1","description":"d","duration":5,
              "audioUrl":"","animationCode":""}]}]"#;
        let chapters = parse_document(body).unwrap();
        assert!(chapters[0].scenes[0].audio_url.is_none());
        assert!(chapters[0].scenes[0].animation_code.is_none());
    }
}
