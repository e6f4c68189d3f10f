//! Player engine
//!
//! Wraps the pure [`PlayerMachine`] with document lifecycle, the timing
//! driver, the controls-visibility timer and event broadcasting. All
//! mutation funnels through one write lock, so the machine has exactly one
//! writer context.
//!
//! Timers are epoch-guarded spawned tasks: every restart bumps the epoch and
//! a task re-checks its epoch under the state lock before mutating. A user
//! navigation racing a tick therefore always wins, and a scene can never be
//! advanced twice in the same tick window.

use crate::loader::{DocumentLoader, LoadError};
use crate::player::keys::{self, KeyCommand};
use crate::player::machine::{PlayerMachine, TickOutcome};
use nova_common::events::{PlayerEvent, PlayerSnapshot};
use nova_common::models::Scene;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, sleep, Duration};
use tracing::{debug, info, warn};

/// Fixed timing-driver period
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Idle delay before transport controls auto-hide during playback
const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Lifecycle of the loaded document
enum DocumentState {
    /// No load attempted yet
    Idle,
    /// Last load failed; the UI shows the retry view
    Failed { book: String, message: String },
    /// Document loaded and playable
    Ready { book: String, machine: PlayerMachine },
}

/// Handler-facing view of the whole player, including load status
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOverview {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PlayerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub controls_visible: bool,
}

/// The player engine
///
/// Cheap to clone; clones share the same state and timers, so spawned
/// timer tasks hold an engine handle.
#[derive(Clone)]
pub struct PlayerEngine {
    state: Arc<RwLock<DocumentState>>,
    event_tx: broadcast::Sender<PlayerEvent>,
    ticker_epoch: Arc<AtomicU64>,
    controls_epoch: Arc<AtomicU64>,
    controls_visible: Arc<AtomicBool>,
    loader: DocumentLoader,
    tick_period: Duration,
    controls_delay: Duration,
}

impl PlayerEngine {
    pub fn new(loader: DocumentLoader) -> Self {
        Self::with_timing(loader, TICK_PERIOD, CONTROLS_HIDE_DELAY)
    }

    /// Engine with explicit timer periods
    pub fn with_timing(
        loader: DocumentLoader,
        tick_period: Duration,
        controls_delay: Duration,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(DocumentState::Idle)),
            event_tx,
            ticker_epoch: Arc::new(AtomicU64::new(0)),
            controls_epoch: Arc::new(AtomicU64::new(0)),
            controls_visible: Arc::new(AtomicBool::new(true)),
            loader,
            tick_period,
            controls_delay,
        }
    }

    /// Subscribe to the player event stream (SSE feed)
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, event: PlayerEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    /// Load (or retry) the document for `book` and reset the cursor to (0,0)
    pub async fn load(&self, book: &str) -> Result<PlayerSnapshot, LoadError> {
        info!("Loading document: {}", book);
        match self.loader.load(book).await {
            Ok(chapters) => Ok(self.install_document(book, chapters).await),
            Err(e) => {
                warn!("Document load failed for {}: {}", book, e);
                {
                    let mut guard = self.state.write().await;
                    self.ticker_epoch.fetch_add(1, Ordering::SeqCst);
                    *guard = DocumentState::Failed {
                        book: book.to_string(),
                        message: e.to_string(),
                    };
                }
                self.broadcast(PlayerEvent::DocumentLoadFailed {
                    book: book.to_string(),
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Install an already-validated document, replacing any current one
    ///
    /// The cursor resets to (0,0) with zero progress and playback paused.
    pub async fn install_document(
        &self,
        book: &str,
        chapters: Vec<nova_common::models::Chapter>,
    ) -> PlayerSnapshot {
        let chapter_count = chapters.len();
        let machine = PlayerMachine::new(chapters);
        let snapshot = machine.snapshot();
        let scene = machine.current_scene().clone();
        {
            let mut guard = self.state.write().await;
            // Cancel any ticker still bound to the previous document
            self.ticker_epoch.fetch_add(1, Ordering::SeqCst);
            *guard = DocumentState::Ready {
                book: book.to_string(),
                machine,
            };
        }
        info!("Document loaded: {} ({} chapters)", book, chapter_count);
        self.broadcast(PlayerEvent::DocumentLoaded {
            book: book.to_string(),
            chapter_count,
            timestamp: chrono::Utc::now(),
        });
        self.broadcast(PlayerEvent::StateChanged {
            snapshot: snapshot.clone(),
            timestamp: chrono::Utc::now(),
        });
        self.broadcast(PlayerEvent::SceneChanged {
            scene,
            timestamp: chrono::Utc::now(),
        });
        self.restart_controls_timer();
        snapshot
    }

    /// Full view for `GET /player/state`
    pub async fn overview(&self) -> PlayerOverview {
        let guard = self.state.read().await;
        let controls_visible = self.controls_visible.load(Ordering::SeqCst);
        match &*guard {
            DocumentState::Idle => PlayerOverview {
                status: "idle",
                book: None,
                snapshot: None,
                scene: None,
                message: None,
                controls_visible,
            },
            DocumentState::Failed { book, message } => PlayerOverview {
                status: "failed",
                book: Some(book.clone()),
                snapshot: None,
                scene: None,
                message: Some(message.clone()),
                controls_visible,
            },
            DocumentState::Ready { book, machine } => PlayerOverview {
                status: "ready",
                book: Some(book.clone()),
                snapshot: Some(machine.snapshot()),
                scene: Some(machine.current_scene().clone()),
                message: None,
                controls_visible,
            },
        }
    }

    /// Current snapshot, if a document is loaded
    pub async fn snapshot(&self) -> Option<PlayerSnapshot> {
        let guard = self.state.read().await;
        match &*guard {
            DocumentState::Ready { machine, .. } => Some(machine.snapshot()),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Transport operations
    // ------------------------------------------------------------------

    pub async fn toggle_play(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| m.toggle_play()).await?;
        Some(outcome.snapshot)
    }

    pub async fn next_scene(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| m.next_scene()).await?;
        if !outcome.result && outcome.changed {
            // Terminal boundary reached just now
            self.broadcast(PlayerEvent::PlaybackFinished {
                timestamp: chrono::Utc::now(),
            });
        }
        Some(outcome.snapshot)
    }

    pub async fn prev_scene(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| m.prev_scene()).await?;
        Some(outcome.snapshot)
    }

    pub async fn jump_to_chapter(&self, index: usize) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(move |m| m.jump_to_chapter(index)).await?;
        Some(outcome.snapshot)
    }

    pub async fn jump_to_scene(&self, index: usize) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(move |m| m.jump_to_scene(index)).await?;
        Some(outcome.snapshot)
    }

    pub async fn toggle_mute(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| {
            m.toggle_mute();
        })
        .await?;
        Some(outcome.snapshot)
    }

    pub async fn toggle_fullscreen(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| {
            m.toggle_fullscreen();
        })
        .await?;
        Some(outcome.snapshot)
    }

    pub async fn exit_fullscreen(&self) -> Option<PlayerSnapshot> {
        let outcome = self.mutate(|m| {
            m.exit_fullscreen();
        })
        .await?;
        Some(outcome.snapshot)
    }

    /// Apply the command bound to a keyboard code. Returns the command only
    /// when it was actually applied; unmapped codes and key presses without
    /// a loaded document both report None.
    pub async fn handle_key(&self, code: &str) -> Option<KeyCommand> {
        let command = keys::command_for(code)?;
        debug!("Key {} -> {:?}", code, command);
        let applied = match command {
            KeyCommand::TogglePlay => self.toggle_play().await,
            KeyCommand::NextScene => self.next_scene().await,
            KeyCommand::PrevScene => self.prev_scene().await,
            KeyCommand::ToggleMute => self.toggle_mute().await,
            KeyCommand::ToggleFullscreen => self.toggle_fullscreen().await,
            KeyCommand::ExitFullscreen => self.exit_fullscreen().await,
        };
        applied.map(|_| command)
    }

    /// Pointer moved over the player view; keeps controls visible
    pub fn pointer_activity(&self) {
        self.restart_controls_timer();
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // Mutation plumbing
    // ------------------------------------------------------------------

    /// Run `f` against the machine under the write lock, then broadcast the
    /// resulting events and restart timers whose triggering condition
    /// changed. Returns None when no document is loaded.
    async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut PlayerMachine) -> R,
    ) -> Option<MutationOutcome<R>> {
        let mut events: Vec<PlayerEvent> = Vec::new();
        let mut ticker_restart: Option<u64> = None;
        let mut controls_restart = false;
        let result;
        let snapshot;
        let changed;
        {
            let mut guard = self.state.write().await;
            let DocumentState::Ready { machine, .. } = &mut *guard else {
                return None;
            };
            let before = machine.snapshot();
            result = f(machine);
            snapshot = machine.snapshot();
            changed = snapshot != before;
            if changed {
                events.push(PlayerEvent::StateChanged {
                    snapshot: snapshot.clone(),
                    timestamp: chrono::Utc::now(),
                });
                let cursor_moved = snapshot.chapter_index != before.chapter_index
                    || snapshot.scene_index != before.scene_index;
                if cursor_moved {
                    events.push(PlayerEvent::SceneChanged {
                        scene: machine.current_scene().clone(),
                        timestamp: chrono::Utc::now(),
                    });
                }
                if cursor_moved || snapshot.is_playing != before.is_playing {
                    // Epoch bump happens under the lock so a tick task
                    // already waiting on it observes the cancellation.
                    ticker_restart =
                        Some(self.ticker_epoch.fetch_add(1, Ordering::SeqCst) + 1);
                    controls_restart = true;
                }
            }
        }
        for event in events {
            self.broadcast(event);
        }
        if let Some(epoch) = ticker_restart {
            self.spawn_ticker(epoch);
        }
        if controls_restart {
            self.restart_controls_timer();
        }
        Some(MutationOutcome {
            result,
            snapshot,
            changed,
        })
    }

    // ------------------------------------------------------------------
    // Timing driver
    // ------------------------------------------------------------------

    fn spawn_ticker(&self, epoch: u64) {
        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_ticker(epoch).await;
        });
    }

    async fn run_ticker(self, epoch: u64) {
        let mut tick = interval(self.tick_period);
        tick.tick().await; // first tick completes immediately
        loop {
            tick.tick().await;
            if self.ticker_epoch.load(Ordering::SeqCst) != epoch {
                debug!("Ticker epoch {} cancelled", epoch);
                return;
            }

            let mut events: Vec<PlayerEvent> = Vec::new();
            let mut respawn: Option<u64> = None;
            let mut stop = false;
            {
                let mut guard = self.state.write().await;
                // Re-check under the lock: a user operation may have won the
                // race for this tick window.
                if self.ticker_epoch.load(Ordering::SeqCst) != epoch {
                    return;
                }
                let DocumentState::Ready { machine, .. } = &mut *guard else {
                    return;
                };
                match machine.tick() {
                    TickOutcome::Idle => return,
                    TickOutcome::Progressed => {
                        events.push(PlayerEvent::PlaybackProgress {
                            chapter_index: machine.cursor().chapter,
                            scene_index: machine.cursor().scene,
                            progress_percent: machine.progress_percent(),
                            timestamp: chrono::Utc::now(),
                        });
                    }
                    TickOutcome::SceneAdvanced => {
                        events.push(PlayerEvent::StateChanged {
                            snapshot: machine.snapshot(),
                            timestamp: chrono::Utc::now(),
                        });
                        events.push(PlayerEvent::SceneChanged {
                            scene: machine.current_scene().clone(),
                            timestamp: chrono::Utc::now(),
                        });
                        // New scene, new duration: the tick cadence restarts
                        respawn =
                            Some(self.ticker_epoch.fetch_add(1, Ordering::SeqCst) + 1);
                    }
                    TickOutcome::Finished => {
                        events.push(PlayerEvent::StateChanged {
                            snapshot: machine.snapshot(),
                            timestamp: chrono::Utc::now(),
                        });
                        events.push(PlayerEvent::PlaybackFinished {
                            timestamp: chrono::Utc::now(),
                        });
                        self.ticker_epoch.fetch_add(1, Ordering::SeqCst);
                        stop = true;
                    }
                }
            }
            for event in events {
                self.broadcast(event);
            }
            if let Some(next_epoch) = respawn {
                self.spawn_ticker(next_epoch);
                self.restart_controls_timer();
                return;
            }
            if stop {
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Controls-visibility sub-driver
    // ------------------------------------------------------------------

    /// Show the controls and (re)arm the auto-hide timer. Controls are only
    /// ever auto-hidden while playing.
    fn restart_controls_timer(&self) {
        let epoch = self.controls_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_controls_visible(true);
        let engine = self.clone();
        tokio::spawn(async move {
            sleep(engine.controls_delay).await;
            if engine.controls_epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            let playing = {
                let guard = engine.state.read().await;
                matches!(&*guard, DocumentState::Ready { machine, .. } if machine.is_playing())
            };
            if playing && engine.controls_epoch.load(Ordering::SeqCst) == epoch {
                engine.set_controls_visible(false);
            }
        });
    }

    fn set_controls_visible(&self, visible: bool) {
        if self.controls_visible.swap(visible, Ordering::SeqCst) != visible {
            self.broadcast(PlayerEvent::ControlsVisibility {
                visible,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}

struct MutationOutcome<R> {
    result: R,
    snapshot: PlayerSnapshot,
    changed: bool,
}
