//! Scene playback: pure state machine, keyboard mapping and the engine
//! that drives them with timers and events.

pub mod engine;
pub mod keys;
pub mod machine;

pub use engine::{PlayerEngine, PlayerOverview};
pub use keys::{command_for, KeyCommand};
pub use machine::{Cursor, PlayerMachine, TickOutcome};
