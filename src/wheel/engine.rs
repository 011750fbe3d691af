//! The wheel: spin, resolve, and drive turns and rounds.

use crate::core::{
    ActionSpec, ActionSpecError, GameConfig, GameRng, GameState, StateError,
};

use super::outcome::Outcome;
use super::resolver::{ActionResolver, ResolverContext};
use super::status::{self, GameStatus};

/// Spins the configured wheel against a game.
///
/// The wheel borrows both the configuration and the state; it owns only
/// its RNG. Every score change goes through `GameState`.
pub struct GameWheel<'a> {
    config: &'a GameConfig,
    state: &'a mut GameState,
    rng: GameRng,
}

impl<'a> GameWheel<'a> {
    /// Create a wheel for `state` using `config`'s options and limits.
    pub fn new(config: &'a GameConfig, state: &'a mut GameState, rng: GameRng) -> Self {
        Self { config, state, rng }
    }

    /// The game being played.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &*self.state
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        self.config
    }

    /// Draw one option, weight-proportionally.
    pub fn spin(&mut self) -> Result<Outcome, WheelError> {
        let options = self.config.wheel_options();
        let weights: Vec<u32> = options.iter().map(|option| option.weight).collect();

        let index = self.rng.choose_weighted(&weights).ok_or(WheelError::EmptyWheel)?;
        let outcome = Outcome::new(&options[index]);

        log::debug!("Wheel landed on '{}' ({})", outcome.label, outcome.action);
        Ok(outcome)
    }

    /// Resolve `outcome` for `team` and commit it as an event.
    ///
    /// Fills in `outcome.score_changes` and `outcome.description` first,
    /// then applies them. A malformed action spec fails before anything
    /// changes.
    pub fn resolve(&mut self, outcome: &mut Outcome, team: &str) -> Result<(), WheelError> {
        if !self.state.has_team(team) {
            return Err(WheelError::UnknownTeam(team.to_string()));
        }

        let spec = ActionSpec::parse(&outcome.action)?;
        let context = ResolverContext {
            state: &*self.state,
            max_points: self.config.max_points(),
        };
        let resolution = ActionResolver::resolve(&spec.kind, team, &context, &mut self.rng);

        outcome.score_changes = resolution.score_changes;
        outcome.description = resolution.description;

        self.state.apply_score_changes(
            &outcome.score_changes,
            team,
            &outcome.action,
            &outcome.description,
        )?;
        Ok(())
    }

    /// Spin and resolve for `team`, or for the current team when `None`.
    ///
    /// Does not advance the turn.
    pub fn spin_and_resolve(&mut self, team: Option<&str>) -> Result<(Outcome, String), WheelError> {
        let team = team.unwrap_or_else(|| self.state.current_team()).to_string();

        let mut outcome = self.spin()?;
        self.resolve(&mut outcome, &team)?;

        Ok((outcome, team))
    }

    /// Pass the turn on. Returns the new current team.
    pub fn advance_turn(&mut self) -> Result<String, WheelError> {
        Ok(self.state.advance_turn()?.to_string())
    }

    /// Start the next round. Returns the new round number.
    pub fn advance_round(&mut self) -> Result<u32, WheelError> {
        Ok(self.state.advance_round()?)
    }

    /// Round limit passed, or points cap reached. Check before spinning.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        status::is_game_over(self.config, &*self.state)
    }

    /// Current status, with the winner once the game is over.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        GameStatus::new(self.config, &*self.state)
    }
}

/// Pick a random team to go first.
pub fn pick_random_starting_team<'t>(teams: &'t [String], rng: &mut GameRng) -> Option<&'t str> {
    rng.choose(teams).map(String::as_str)
}

/// Errors from spinning or resolving.
#[derive(Debug, thiserror::Error)]
pub enum WheelError {
    #[error("The wheel has no options with a positive weight")]
    EmptyWheel,

    #[error("Team '{0}' not found in game")]
    UnknownTeam(String),

    #[error("Malformed wheel action: {0}")]
    Action(#[from] ActionSpecError),

    #[error(transparent)]
    State(#[from] StateError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WheelOption;

    fn config_with(options: Vec<WheelOption>) -> GameConfig {
        let mut config = GameConfig::default();
        config.set_wheel_options(options).unwrap();
        config
    }

    fn new_state() -> GameState {
        GameState::new(vec!["Red".to_string(), "Blue".to_string()], 10, 1)
    }

    #[test]
    fn test_spin_single_option() {
        let config = config_with(vec![WheelOption::new("Only", "add_fixed:1", 4)]);
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        let outcome = wheel.spin().unwrap();

        assert_eq!(outcome.label, "Only");
        assert_eq!(outcome.weight, 4);
        assert!(outcome.score_changes.is_empty());
        assert!(wheel.state().events().is_empty()); // Spinning alone changes nothing
    }

    #[test]
    fn test_spin_returns_configured_options() {
        let config = GameConfig::default();
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(1));

        for _ in 0..50 {
            let outcome = wheel.spin().unwrap();
            assert!(config.wheel_options().iter().any(|o| o.label == outcome.label));
        }
    }

    #[test]
    fn test_resolve_commits_event() {
        let config = config_with(vec![WheelOption::new("+5", "add_fixed:5", 1)]);
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        let mut outcome = wheel.spin().unwrap();
        wheel.resolve(&mut outcome, "Blue").unwrap();

        assert_eq!(outcome.description, "Blue gains 5 points!");
        assert_eq!(wheel.state().score("Blue"), Some(15));

        let events = wheel.state().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "add_fixed:5");
        assert_eq!(events[0].team, "Blue");
    }

    #[test]
    fn test_resolve_malformed_action_changes_nothing() {
        let config = config_with(vec![WheelOption::new("Broken", "steal:many", 1)]);
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        let result = wheel.spin_and_resolve(None);

        assert!(matches!(result, Err(WheelError::Action(_))));
        assert!(wheel.state().events().is_empty());
        assert_eq!(wheel.state().score("Red"), Some(10));
    }

    #[test]
    fn test_resolve_unknown_team() {
        let config = GameConfig::default();
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        let mut outcome = wheel.spin().unwrap();
        let result = wheel.resolve(&mut outcome, "Purple");

        assert!(matches!(result, Err(WheelError::UnknownTeam(_))));
    }

    #[test]
    fn test_spin_and_resolve_uses_current_team() {
        let config = config_with(vec![WheelOption::new("Wild", "wildcard", 1)]);
        let mut state = new_state();
        state.set_current_team("Blue").unwrap();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        let (outcome, team) = wheel.spin_and_resolve(None).unwrap();

        assert_eq!(team, "Blue");
        assert!(outcome.is_resolved());
        assert_eq!(wheel.state().current_team(), "Blue"); // Turn not advanced
    }

    #[test]
    fn test_advance_pass_through() {
        let config = GameConfig::default();
        let mut state = new_state();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(42));

        assert_eq!(wheel.advance_turn().unwrap(), "Blue");
        assert_eq!(wheel.advance_round().unwrap(), 2);
        assert_eq!(wheel.state().current_team(), "Red");
    }

    #[test]
    fn test_pick_random_starting_team() {
        let teams = vec!["Red".to_string(), "Blue".to_string()];
        let mut rng = GameRng::new(5);

        let picked = pick_random_starting_team(&teams, &mut rng).unwrap();
        assert!(teams.iter().any(|team| team == picked));
        assert!(pick_random_starting_team(&[], &mut rng).is_none());
    }
}
