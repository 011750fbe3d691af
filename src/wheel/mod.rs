//! The outcome engine.
//!
//! - `GameWheel`: weighted spins, resolution, turn and round pass-through
//! - `ActionResolver`: one resolver per action kind
//! - `Outcome`: the transient result of a spin
//! - `GameStatus`: end-of-game detection and standings
//!
//! ## Resolution order
//!
//! A spin selects an option; resolving it parses the action spec, computes
//! changes from pre-spin scores, and hands them to
//! `GameState::apply_score_changes`, which clamps, records and persists.

mod engine;
mod outcome;
mod resolver;
mod status;

pub use engine::{pick_random_starting_team, GameWheel, WheelError};
pub use outcome::Outcome;
pub use resolver::{
    ActionResolver, Resolution, ResolverContext, MYSTERY_BONUS, RUBBER_BAND_BONUS,
    STEAL_CONSOLATION, WILDCARD_BONUS,
};
pub use status::{is_game_over, GameStatus, Standing};
