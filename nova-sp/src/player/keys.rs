//! Keyboard control surface
//!
//! Static mapping from browser `KeyboardEvent.code` values to player
//! commands. The embedded UI owns the single document-level listener
//! (attached on mount, detached on teardown) and reports codes here so the
//! mapping itself lives in one tested place.

/// Player command bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePlay,
    NextScene,
    PrevScene,
    ToggleMute,
    ToggleFullscreen,
    ExitFullscreen,
}

impl KeyCommand {
    /// Whether the browser default for the key must be suppressed
    /// (space would otherwise scroll the page, arrows would pan)
    pub fn suppresses_default(&self) -> bool {
        !matches!(self, KeyCommand::ExitFullscreen)
    }
}

/// Look up the command bound to a key code, if any
pub fn command_for(code: &str) -> Option<KeyCommand> {
    match code {
        "Space" => Some(KeyCommand::TogglePlay),
        "ArrowRight" => Some(KeyCommand::NextScene),
        "ArrowLeft" => Some(KeyCommand::PrevScene),
        "KeyM" => Some(KeyCommand::ToggleMute),
        "KeyF" => Some(KeyCommand::ToggleFullscreen),
        "Escape" => Some(KeyCommand::ExitFullscreen),
        _ => None,
    }
}
