//! Game state: teams, scores, turn pointer, round counter and history.
//!
//! ## State machine
//!
//! The state is the triple (round, turn index, scores) plus the event log.
//! Transitions:
//!
//! - `apply_score_changes`: add deltas, clamp at 0, append one event
//! - `set_current_team`: repoint the turn index, append a bookkeeping event
//! - `advance_turn`: `(index + 1) % team_count`
//! - `advance_round`: `round += 1`, index reset to 0
//!
//! ## Persistence
//!
//! A state bound to a save file writes the full snapshot after every
//! mutation, before returning. Writes are atomic (see `persist`), and
//! `GameState::load` either reconstructs every field or fails with a
//! `LoadError` describing why.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use im::{OrdMap, Vector};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::event::{GameEvent, ScoreChanges};
use super::persist::{SnapshotError, SnapshotFile};

/// Action id recorded when the current team is set by hand.
pub const TEAM_CHANGED: &str = "team_changed";

/// Keys a file must contain to count as a saved game.
const REQUIRED_KEYS: [&str; 3] = ["teams", "scores", "current_round"];

/// State of an active game.
///
/// Scores and history use `im` persistent structures so that query
/// methods can hand out owned copies in O(1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    teams: Vec<String>,
    scores: OrdMap<String, i64>,
    current_round: u32,
    current_turn_index: usize,
    game_started: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    events: Vector<GameEvent>,

    #[serde(skip)]
    save_file: Option<SnapshotFile>,
}

impl PartialEq for GameState {
    /// Compares game content; the bound save file is not part of it.
    fn eq(&self, other: &Self) -> bool {
        self.teams == other.teams
            && self.scores == other.scores
            && self.current_round == other.current_round
            && self.current_turn_index == other.current_turn_index
            && self.game_started == other.game_started
            && self.last_updated == other.last_updated
            && self.events == other.events
    }
}

impl GameState {
    /// Create an in-memory game that is never written to disk.
    ///
    /// Teams must be non-empty; callers validate uniqueness and the
    /// two-team minimum before starting a game.
    #[must_use]
    pub fn new(teams: Vec<String>, starting_points: i64, starting_round: u32) -> Self {
        assert!(!teams.is_empty(), "Must have at least 1 team");

        let scores = teams
            .iter()
            .map(|team| (team.clone(), starting_points.max(0)))
            .collect();
        let now = Utc::now();

        Self {
            teams,
            scores,
            current_round: starting_round,
            current_turn_index: 0,
            game_started: now,
            last_updated: now,
            events: Vector::new(),
            save_file: None,
        }
    }

    /// Create a game bound to `path` and save it immediately.
    pub fn create(
        teams: Vec<String>,
        starting_points: i64,
        starting_round: u32,
        path: impl Into<PathBuf>,
    ) -> Result<Self, StateError> {
        let mut state = Self::new(teams, starting_points, starting_round);
        state.bind_to(path)?;
        log::info!(
            "New game with teams [{}] at {} points",
            state.teams.join(", "),
            starting_points
        );
        Ok(state)
    }

    /// Load a saved game.
    ///
    /// All-or-nothing: a missing key or an inconsistent field rejects the
    /// whole file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = SnapshotFile::new(path.as_ref());
        if !file.exists() {
            return Err(LoadError::Absent(file.path().to_path_buf()));
        }

        let json = file.read().map_err(LoadError::Unreadable)?;
        let value: serde_json::Value =
            serde_json::from_str(&json).map_err(|e| LoadError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(LoadError::Malformed("top level is not an object".to_string()));
        }

        let mut state: GameState =
            serde_json::from_value(value).map_err(|e| LoadError::SchemaMismatch(e.to_string()))?;
        state.check_consistency().map_err(LoadError::SchemaMismatch)?;
        state.save_file = Some(file);

        log::info!(
            "Loaded game from {} (round {}, {} events)",
            path.as_ref().display(),
            state.current_round,
            state.events.len()
        );
        Ok(state)
    }

    fn check_consistency(&self) -> Result<(), String> {
        if self.teams.is_empty() {
            return Err("no teams".to_string());
        }
        let mut seen = FxHashSet::default();
        for team in &self.teams {
            if !seen.insert(team.as_str()) {
                return Err(format!("duplicate team '{team}'"));
            }
            match self.scores.get(team) {
                None => return Err(format!("no score for team '{team}'")),
                Some(score) if *score < 0 => {
                    return Err(format!("negative score for team '{team}'"));
                }
                Some(_) => {}
            }
        }
        if self.scores.len() != self.teams.len() {
            return Err("scores contain unknown teams".to_string());
        }
        if self.current_turn_index >= self.teams.len() {
            return Err(format!("turn index {} out of range", self.current_turn_index));
        }
        if self.current_round == 0 {
            return Err("round must be positive".to_string());
        }
        Ok(())
    }

    /// Bind to a (new) save file and write the snapshot there.
    pub fn bind_to(&mut self, path: impl Into<PathBuf>) -> Result<(), StateError> {
        self.save_file = Some(SnapshotFile::new(path.into()));
        self.save()
    }

    /// The bound save file, if any.
    #[must_use]
    pub fn save_path(&self) -> Option<&Path> {
        self.save_file.as_ref().map(SnapshotFile::path)
    }

    /// Write the full snapshot. No-op for in-memory games.
    pub fn save(&self) -> Result<(), StateError> {
        if let Some(file) = &self.save_file {
            file.write(self)?;
        }
        Ok(())
    }

    /// Remove the bound save file if it exists.
    pub fn delete_save_file(&self) -> Result<(), StateError> {
        if let Some(file) = &self.save_file {
            file.remove().map_err(SnapshotError::from)?;
        }
        Ok(())
    }

    // === Queries ===

    /// Team names in turn order.
    #[must_use]
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Is `team` part of this game?
    #[must_use]
    pub fn has_team(&self, team: &str) -> bool {
        self.scores.contains_key(team)
    }

    /// The team whose turn it is.
    #[must_use]
    pub fn current_team(&self) -> &str {
        &self.teams[self.current_turn_index]
    }

    /// Index of the current team in `teams()`.
    #[must_use]
    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    /// Current round number.
    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Snapshot of all scores.
    #[must_use]
    pub fn scores(&self) -> OrdMap<String, i64> {
        self.scores.clone()
    }

    /// Score of a single team.
    #[must_use]
    pub fn score(&self, team: &str) -> Option<i64> {
        self.scores.get(team).copied()
    }

    /// Teams by score, highest first; ties keep turn order.
    #[must_use]
    pub fn ranked_scores(&self) -> Vec<(String, i64)> {
        let mut ranked: Vec<_> = self
            .teams
            .iter()
            .map(|team| (team.clone(), self.scores.get(team).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Full event history in order.
    #[must_use]
    pub fn events(&self) -> Vector<GameEvent> {
        self.events.clone()
    }

    /// Events of `round`, or of the current round when `None`.
    #[must_use]
    pub fn round_events(&self, round: Option<u32>) -> Vec<GameEvent> {
        let round = round.unwrap_or(self.current_round);
        self.events
            .iter()
            .filter(|event| event.round_number == round)
            .cloned()
            .collect()
    }

    /// When the game was created.
    #[must_use]
    pub fn game_started(&self) -> DateTime<Utc> {
        self.game_started
    }

    /// When the game last changed.
    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    // === Mutations ===

    /// Apply requested deltas, clamp every touched score at 0, record one event.
    ///
    /// The event keeps the requested (pre-clamp) deltas. Caps are the
    /// caller's concern. Fails without changing anything if a delta names
    /// a team that is not in the game.
    pub fn apply_score_changes(
        &mut self,
        changes: &ScoreChanges,
        team: &str,
        action: &str,
        description: &str,
    ) -> Result<(), StateError> {
        if let Some(unknown) = changes.keys().find(|name| !self.scores.contains_key(*name)) {
            return Err(StateError::TeamNotFound(unknown.clone()));
        }

        for (name, delta) in changes {
            if let Some(score) = self.scores.get_mut(name) {
                *score = score.saturating_add(*delta).max(0);
            }
        }

        self.push_event(team, action, description, changes.clone());
        self.save()
    }

    /// Record an event that changes no score.
    pub fn record_event(
        &mut self,
        action: &str,
        description: &str,
        team: &str,
    ) -> Result<(), StateError> {
        self.push_event(team, action, description, ScoreChanges::new());
        self.save()
    }

    fn push_event(&mut self, team: &str, action: &str, description: &str, changes: ScoreChanges) {
        let event = GameEvent::now(self.current_round, team, action, description, changes);
        log::debug!("Round {}: {} ({})", event.round_number, event.description, event.action);
        self.last_updated = event.timestamp;
        self.events.push_back(event);
    }

    /// Make `team` the current team.
    pub fn set_current_team(&mut self, team: &str) -> Result<(), StateError> {
        let index = self
            .teams
            .iter()
            .position(|name| name == team)
            .ok_or_else(|| StateError::TeamNotFound(team.to_string()))?;

        self.current_turn_index = index;
        self.record_event(TEAM_CHANGED, &format!("Current team set to {team}"), "")
    }

    /// Pass the turn to the next team, wrapping around. Returns the new current team.
    pub fn advance_turn(&mut self) -> Result<&str, StateError> {
        self.current_turn_index = (self.current_turn_index + 1) % self.teams.len();
        self.touch()?;
        Ok(self.current_team())
    }

    /// Start the next round with the first team. Returns the new round number.
    pub fn advance_round(&mut self) -> Result<u32, StateError> {
        self.current_round = self
            .current_round
            .checked_add(1)
            .ok_or(StateError::RoundOverflow(self.current_round))?;
        self.current_turn_index = 0;
        self.touch()?;
        log::info!("Advanced to round {}", self.current_round);
        Ok(self.current_round)
    }

    fn touch(&mut self) -> Result<(), StateError> {
        self.last_updated = Utc::now();
        self.save()
    }

    // === Display ===

    /// Multi-line summary: round, current team, ranked scores, event counts.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let current = self.current_team();

        let _ = writeln!(out, "=== Current Game State ===");
        let _ = writeln!(out, "Round: {}", self.current_round);
        let _ = writeln!(out, "Current Turn: {current}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Scores:");
        for (i, (team, score)) in self.ranked_scores().iter().enumerate() {
            let marker = if team == current { " <-- Current turn" } else { "" };
            let _ = writeln!(out, "  {}. {team}: {score} points{marker}", i + 1);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Total Events: {}", self.events.len());
        let _ = write!(out, "Events This Round: {}", self.round_events(None).len());
        out
    }

    /// Numbered event listing for one round.
    #[must_use]
    pub fn round_history(&self, round: Option<u32>) -> String {
        let round = round.unwrap_or(self.current_round);
        let events = self.round_events(Some(round));

        let mut out = format!("=== Round {round} History ===");
        if events.is_empty() {
            out.push_str("\nNo events yet this round.");
        }
        for (i, event) in events.iter().enumerate() {
            let _ = write!(
                out,
                "\n{:2}. [{}] {}: {}",
                i + 1,
                event.timestamp.format("%H:%M:%S"),
                event.team,
                event.description
            );
        }
        out
    }
}

/// Does `path` hold something that looks like a saved game?
///
/// Only checks that the file parses and has the core keys; use
/// `GameState::load` for full validation.
#[must_use]
pub fn has_saved_game(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.exists() {
        return false;
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).map_err(|e| e.to_string()));

    match parsed {
        Ok(value) => REQUIRED_KEYS.iter().all(|key| value.get(key).is_some()),
        Err(e) => {
            log::warn!("Ignoring unreadable save file {}: {e}", path.display());
            false
        }
    }
}

/// Errors from state mutations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Team '{0}' not found in game")]
    TeamNotFound(String),

    #[error("Round {0} is the last representable round")]
    RoundOverflow(u32),

    #[error("Failed to save game state: {0}")]
    Persist(#[from] SnapshotError),
}

/// Why a saved game could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No saved game at {}", .0.display())]
    Absent(PathBuf),

    #[error("Saved game is unreadable: {0}")]
    Unreadable(std::io::Error),

    #[error("Saved game is not valid JSON: {0}")]
    Malformed(String),

    #[error("Saved game does not match the expected layout: {0}")]
    SchemaMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn changes(entries: &[(&str, i64)]) -> ScoreChanges {
        entries.iter().map(|(team, delta)| (team.to_string(), *delta)).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new(teams(&["Red", "Blue"]), 10, 1);

        assert_eq!(state.teams(), &["Red".to_string(), "Blue".to_string()]);
        assert_eq!(state.score("Red"), Some(10));
        assert_eq!(state.score("Blue"), Some(10));
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.current_team(), "Red");
        assert!(state.events().is_empty());
        assert_eq!(state.game_started(), state.last_updated());
        assert!(state.save_path().is_none());
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 team")]
    fn test_no_teams_panics() {
        let _ = GameState::new(Vec::new(), 10, 1);
    }

    #[test]
    fn test_apply_score_changes() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);

        state
            .apply_score_changes(&changes(&[("Red", 5), ("Blue", -3)]), "Red", "test", "Test")
            .unwrap();

        assert_eq!(state.score("Red"), Some(15));
        assert_eq!(state.score("Blue"), Some(7));

        let events = state.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].team, "Red");
        assert_eq!(events[0].action, "test");
        assert_eq!(events[0].round_number, 1);
    }

    #[test]
    fn test_scores_never_negative_and_history_keeps_request() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 5, 1);

        state
            .apply_score_changes(&changes(&[("Red", -10)]), "Red", "add_fixed:-10", "Ouch")
            .unwrap();

        assert_eq!(state.score("Red"), Some(0));
        assert_eq!(state.events()[0].score_changes.get("Red"), Some(&-10));
    }

    #[test]
    fn test_unknown_team_in_changes_is_rejected() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);

        let result = state.apply_score_changes(&changes(&[("Red", 5), ("Green", 1)]), "Red", "x", "x");

        assert!(matches!(result, Err(StateError::TeamNotFound(name)) if name == "Green"));
        assert_eq!(state.score("Red"), Some(10));
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_advance_turn_wraps() {
        let mut state = GameState::new(teams(&["Red", "Blue", "Green"]), 10, 1);

        assert_eq!(state.advance_turn().unwrap(), "Blue");
        assert_eq!(state.advance_turn().unwrap(), "Green");
        assert_eq!(state.advance_turn().unwrap(), "Red");
        assert_eq!(state.current_round(), 1);
    }

    #[test]
    fn test_advance_round_resets_turn() {
        let mut state = GameState::new(teams(&["Red", "Blue", "Green"]), 10, 1);
        state.advance_turn().unwrap();
        state.advance_turn().unwrap();

        assert_eq!(state.advance_round().unwrap(), 2);
        assert_eq!(state.current_team(), "Red");
        assert_eq!(state.current_turn_index(), 0);
    }

    #[test]
    fn test_advance_round_at_last_round() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, u32::MAX);
        state.advance_turn().unwrap();

        assert!(matches!(
            state.advance_round(),
            Err(StateError::RoundOverflow(round)) if round == u32::MAX
        ));
        assert_eq!(state.current_round(), u32::MAX);
        assert_eq!(state.current_team(), "Blue"); // Turn untouched
    }

    #[test]
    fn test_set_current_team() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);

        state.set_current_team("Blue").unwrap();
        assert_eq!(state.current_team(), "Blue");

        let events = state.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TEAM_CHANGED);
        assert!(events[0].score_changes.is_empty());

        assert!(matches!(
            state.set_current_team("Purple"),
            Err(StateError::TeamNotFound(_))
        ));
        assert_eq!(state.current_team(), "Blue");
    }

    #[test]
    fn test_round_events() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);

        state.apply_score_changes(&changes(&[("Red", 1)]), "Red", "a", "first").unwrap();
        state.advance_round().unwrap();
        state.apply_score_changes(&changes(&[("Blue", 1)]), "Blue", "b", "second").unwrap();
        state.apply_score_changes(&changes(&[("Red", 1)]), "Red", "c", "third").unwrap();

        assert_eq!(state.round_events(Some(1)).len(), 1);
        assert_eq!(state.round_events(None).len(), 2);
        assert!(state.round_events(Some(9)).is_empty());
    }

    #[test]
    fn test_scores_is_a_copy() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);
        let before = state.scores();

        state.apply_score_changes(&changes(&[("Red", 5)]), "Red", "a", "a").unwrap();

        assert_eq!(before.get("Red"), Some(&10));
        assert_eq!(state.score("Red"), Some(15));
    }

    #[test]
    fn test_ranked_scores_ties_keep_turn_order() {
        let mut state = GameState::new(teams(&["Red", "Blue", "Green"]), 10, 1);
        state.apply_score_changes(&changes(&[("Green", 5)]), "Green", "a", "a").unwrap();

        let ranked = state.ranked_scores();
        assert_eq!(ranked[0], ("Green".to_string(), 15));
        assert_eq!(ranked[1], ("Red".to_string(), 10));
        assert_eq!(ranked[2], ("Blue".to_string(), 10));
    }

    #[test]
    fn test_summary() {
        let state = GameState::new(teams(&["Red", "Blue"]), 10, 1);
        let summary = state.summary();

        assert!(summary.contains("Round: 1"));
        assert!(summary.contains("Current Turn: Red"));
        assert!(summary.contains("Red: 10 points <-- Current turn"));
        assert!(summary.contains("Total Events: 0"));
    }

    #[test]
    fn test_round_history() {
        let mut state = GameState::new(teams(&["Red", "Blue"]), 10, 1);
        assert!(state.round_history(None).contains("No events yet this round."));

        state
            .apply_score_changes(&changes(&[("Red", 5)]), "Red", "add_fixed:5", "Red gains 5 points!")
            .unwrap();

        let history = state.round_history(None);
        assert!(history.starts_with("=== Round 1 History ==="));
        assert!(history.contains("Red: Red gains 5 points!"));
    }
}
