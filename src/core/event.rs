//! Game events: the append-only history of resolved actions.

use chrono::{DateTime, Utc};
use im::OrdMap;
use serde::{Deserialize, Serialize};

/// Team name -> score delta, as requested by an action.
pub type ScoreChanges = OrdMap<String, i64>;

/// A single event that occurred during the game.
///
/// Events are created once, appended to the history and never changed.
/// `score_changes` records the requested deltas before clamping, so the
/// history reflects what the wheel asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Round in which the event occurred.
    pub round_number: u32,
    /// Team that triggered the event (empty for bookkeeping events).
    pub team: String,
    /// Action identifier, e.g. `steal:5` or `team_changed`.
    pub action: String,
    /// Human-readable description.
    pub description: String,
    /// Requested score changes.
    pub score_changes: ScoreChanges,
}

impl GameEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn now(
        round_number: u32,
        team: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
        score_changes: ScoreChanges,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            round_number,
            team: team.into(),
            action: action.into(),
            description: description.into(),
            score_changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let mut changes = ScoreChanges::new();
        changes.insert("Red".to_string(), 5);
        changes.insert("Blue".to_string(), -5);

        let event = GameEvent::now(2, "Red", "steal:5", "Red steals 5 points from Blue!", changes);

        assert_eq!(event.round_number, 2);
        assert_eq!(event.team, "Red");
        assert_eq!(event.score_changes.get("Blue"), Some(&-5));
        assert_eq!(event.score_changes.values().sum::<i64>(), 0);
    }

    #[test]
    fn test_event_serde() {
        let event = GameEvent::now(1, "", "team_changed", "Current team set to Blue", ScoreChanges::new());

        let json = serde_json::to_string(&event).unwrap();
        let restored: GameEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event, restored);
    }
}
