//! Playback state machine
//!
//! Pure, framework-agnostic core of the scene player. Owns the cursor, the
//! transport flags and the per-scene progress percentage; every operation is
//! total: out-of-range or boundary requests clamp or no-op, they never fail.
//!
//! Chapters are a grouping concept only; the timing unit is always the scene.

use nova_common::events::PlayerSnapshot;
use nova_common::models::{Chapter, Scene};

/// Position of the player within a loaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub chapter: usize,
    pub scene: usize,
}

/// Result of applying one timing-driver tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed
    Idle,
    /// Progress advanced within the current scene
    Progressed,
    /// Progress crossed 100% and the cursor moved to the next scene
    SceneAdvanced,
    /// Progress crossed 100% on the final scene; playback stopped at 100%
    Finished,
}

/// The playback state machine
///
/// Invariants: the cursor always points at an existing chapter and scene, and
/// `progress_percent` stays within [0, 100]. Constructed only from a
/// validated, non-empty document (see the loader).
#[derive(Debug, Clone)]
pub struct PlayerMachine {
    chapters: Vec<Chapter>,
    cursor: Cursor,
    is_playing: bool,
    is_muted: bool,
    is_fullscreen: bool,
    progress_percent: f64,
}

impl PlayerMachine {
    /// Create a machine positioned at the first scene of the first chapter
    ///
    /// `chapters` must be non-empty with non-empty scene lists; the loader
    /// guarantees this.
    pub fn new(chapters: Vec<Chapter>) -> Self {
        debug_assert!(!chapters.is_empty());
        debug_assert!(chapters.iter().all(|c| !c.scenes.is_empty()));
        Self {
            chapters,
            cursor: Cursor { chapter: 0, scene: 0 },
            is_playing: false,
            is_muted: false,
            is_fullscreen: false,
            progress_percent: 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn current_chapter(&self) -> &Chapter {
        &self.chapters[self.cursor.chapter]
    }

    pub fn current_scene(&self) -> &Scene {
        &self.current_chapter().scenes[self.cursor.scene]
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// True at the last scene of the last chapter
    pub fn at_end(&self) -> bool {
        self.cursor.chapter == self.chapters.len() - 1
            && self.cursor.scene == self.current_chapter().scenes.len() - 1
    }

    /// Serializable snapshot for the presentation layer and SSE
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            chapter_index: self.cursor.chapter,
            scene_index: self.cursor.scene,
            chapter_count: self.chapters.len(),
            scene_count: self.current_chapter().scenes.len(),
            is_playing: self.is_playing,
            is_muted: self.is_muted,
            is_fullscreen: self.is_fullscreen,
            progress_percent: self.progress_percent,
        }
    }

    // ------------------------------------------------------------------
    // Transport operations
    // ------------------------------------------------------------------

    /// Flip play/pause. Starting playback without an audio source is a valid
    /// transition (silent playback).
    pub fn toggle_play(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Advance to the next scene, crossing into the next chapter when the
    /// current one is exhausted. At the very end playback stops with
    /// progress pinned at 100% and the cursor unchanged; returns whether the
    /// cursor moved.
    pub fn next_scene(&mut self) -> bool {
        if self.cursor.scene + 1 < self.current_chapter().scenes.len() {
            self.cursor.scene += 1;
            self.progress_percent = 0.0;
            true
        } else if self.cursor.chapter + 1 < self.chapters.len() {
            self.cursor.chapter += 1;
            self.cursor.scene = 0;
            self.progress_percent = 0.0;
            true
        } else {
            // Finished: terminal condition, not an error
            self.is_playing = false;
            self.progress_percent = 100.0;
            false
        }
    }

    /// Step back one scene, landing on the previous chapter's last scene at
    /// chapter boundaries. No-op at (0,0); returns whether the cursor moved.
    pub fn prev_scene(&mut self) -> bool {
        if self.cursor.scene > 0 {
            self.cursor.scene -= 1;
            self.progress_percent = 0.0;
            true
        } else if self.cursor.chapter > 0 {
            self.cursor.chapter -= 1;
            self.cursor.scene = self.current_chapter().scenes.len() - 1;
            self.progress_percent = 0.0;
            true
        } else {
            false
        }
    }

    /// Jump to the first scene of chapter `index`; out-of-range is ignored.
    /// A successful jump pauses playback.
    pub fn jump_to_chapter(&mut self, index: usize) -> bool {
        if index >= self.chapters.len() {
            return false;
        }
        self.cursor = Cursor {
            chapter: index,
            scene: 0,
        };
        self.progress_percent = 0.0;
        self.is_playing = false;
        true
    }

    /// Jump to scene `index` within the current chapter; out-of-range is
    /// ignored. A successful jump pauses playback.
    pub fn jump_to_scene(&mut self, index: usize) -> bool {
        if index >= self.current_chapter().scenes.len() {
            return false;
        }
        self.cursor.scene = index;
        self.progress_percent = 0.0;
        self.is_playing = false;
        true
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.is_muted = !self.is_muted;
        self.is_muted
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.is_fullscreen = !self.is_fullscreen;
        self.is_fullscreen
    }

    /// Escape semantics: leaves fullscreen if active, otherwise no-op
    pub fn exit_fullscreen(&mut self) -> bool {
        let was = self.is_fullscreen;
        self.is_fullscreen = false;
        was
    }

    // ------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------

    /// Apply one timing-driver tick: progress advances by `100 / duration`
    /// percentage points. Crossing 100% triggers the scene advance instead of
    /// overshooting; the terminal scene keeps the finished 100% state.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing {
            return TickOutcome::Idle;
        }
        let increment = 100.0 / self.current_scene().duration;
        let next = self.progress_percent + increment;
        if next >= 100.0 {
            if self.next_scene() {
                TickOutcome::SceneAdvanced
            } else {
                TickOutcome::Finished
            }
        } else {
            self.progress_percent = next;
            TickOutcome::Progressed
        }
    }
}
