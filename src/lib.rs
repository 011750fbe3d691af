//! # review-wheel
//!
//! A weighted-wheel team scoring game. Teams take turns spinning a wheel
//! of configured options; each option carries an action that adds,
//! steals, shares, multiplies, divides or shuffles points.
//!
//! ## Design Principles
//!
//! 1. **Persist on every mutation**: A game bound to a save file writes a
//!    complete snapshot after each change. Writes are atomic, so a crash
//!    leaves either the old or the new snapshot on disk.
//!
//! 2. **Explicit recovery**: `GameState::load` returns a `LoadError` that
//!    says whether the save was absent, unreadable, malformed, or the wrong
//!    shape. Callers decide what to do; nothing is silently replaced.
//!
//! 3. **Closed action set**: Action specs parse into `ActionKind`. Unknown
//!    kinds are a variant of their own; malformed parameters are errors.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: scores and the event log use `im-rs`,
//!   so handing out copies is O(1).
//!
//! - **Deterministic RNG**: `GameRng` is a seeded ChaCha8 stream; the same
//!   seed replays the same spins.
//!
//! ## Modules
//!
//! - `core`: Configuration, action specs, events, game state, RNG
//! - `wheel`: Spinning, action resolution, end-of-game status

pub mod core;
pub mod wheel;

// Re-export commonly used types
pub use crate::core::{
    ActionKind, ActionSpec, ActionSpecError,
    ConfigError, ConfigStore, GameConfig, WheelOption,
    GameEvent, ScoreChanges,
    GameRng,
    GameState, LoadError, StateError, has_saved_game,
};

pub use crate::wheel::{
    GameWheel, WheelError, Outcome,
    ActionResolver, ResolverContext, Resolution,
    GameStatus, Standing, is_game_over,
    pick_random_starting_team,
};
