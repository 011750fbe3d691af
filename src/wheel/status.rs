//! End-of-game detection and status reporting.

use std::fmt;

use crate::core::{GameConfig, GameState};

/// Is the game over?
///
/// True once the round counter has passed `max_rounds`, or when a points
/// cap is set and some team has reached it.
#[must_use]
pub fn is_game_over(config: &GameConfig, state: &GameState) -> bool {
    if state.current_round() > config.max_rounds() {
        return true;
    }

    let cap = config.max_points();
    cap > 0 && state.scores().values().any(|score| *score >= cap)
}

/// Final standing of a finished game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Standing {
    /// One team has the highest score.
    Winner { team: String, score: i64 },
    /// Several teams share the highest score, in turn order.
    Tie { teams: Vec<String>, score: i64 },
}

impl Standing {
    /// Determine the standing from current scores.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let ranked = state.ranked_scores();
        let top = ranked.first().map_or(0, |(_, score)| *score);
        let mut leaders: Vec<String> = ranked
            .into_iter()
            .filter(|(_, score)| *score == top)
            .map(|(team, _)| team)
            .collect();

        if leaders.len() == 1 {
            Standing::Winner {
                team: leaders.remove(0),
                score: top,
            }
        } else {
            Standing::Tie {
                teams: leaders,
                score: top,
            }
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Standing::Winner { team, score } => write!(f, "Winner: {team} with {score} points!"),
            Standing::Tie { teams, score } => {
                write!(f, "Tie between: {} with {score} points!", teams.join(", "))
            }
        }
    }
}

/// Snapshot of where the game stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameStatus {
    pub round: u32,
    pub current_team: String,
    /// Highest score first.
    pub ranked_scores: Vec<(String, i64)>,
    /// Set only when the game is over.
    pub result: Option<Standing>,
    summary: String,
}

impl GameStatus {
    /// Build the status for `state` under `config`.
    #[must_use]
    pub fn new(config: &GameConfig, state: &GameState) -> Self {
        let result = is_game_over(config, state).then(|| Standing::from_state(state));

        Self {
            round: state.current_round(),
            current_team: state.current_team().to_string(),
            ranked_scores: state.ranked_scores(),
            result,
            summary: state.summary(),
        }
    }

    /// Is the game over?
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)?;
        if let Some(result) = &self.result {
            write!(f, "\n\nGAME OVER!\n{result}")?;
        }
        Ok(())
    }
}
