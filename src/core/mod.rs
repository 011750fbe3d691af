//! Core building blocks: configuration, action specs, events, game state, RNG.
//!
//! Nothing in here knows how a wheel is spun. The `wheel` module builds on
//! these types; the state and config are the only things that touch disk.

pub mod action;
pub mod config;
pub mod event;
pub mod persist;
pub mod rng;
pub mod state;

pub use action::{ActionKind, ActionSpec, ActionSpecError};
pub use config::{ConfigError, ConfigStore, GameConfig, WheelOption};
pub use event::{GameEvent, ScoreChanges};
pub use persist::{SnapshotError, SnapshotFile};
pub use rng::GameRng;
pub use state::{has_saved_game, GameState, LoadError, StateError, TEAM_CHANGED};
