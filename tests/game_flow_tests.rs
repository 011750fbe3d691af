//! End-to-end game flow tests.
//!
//! These tests drive whole games through `GameWheel` the way the command
//! line does: spin, pass the turn, advance rounds, reload from disk.

use tempfile::tempdir;

use review_wheel::core::{ConfigStore, GameConfig, GameRng, GameState, ScoreChanges, WheelOption};
use review_wheel::wheel::{is_game_over, pick_random_starting_team, GameWheel, Standing};

fn teams(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Test that a one-round game ends as soon as the round advances.
#[test]
fn test_single_round_game_ends_without_spins() {
    let mut config = GameConfig::default();
    config.set_max_rounds(1).unwrap();
    let mut state = GameState::new(teams(&["A", "B"]), 10, 1);
    let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(0));

    assert!(!wheel.is_game_over());
    wheel.advance_round().unwrap();

    assert!(wheel.is_game_over());
    assert!(wheel.state().events().is_empty());

    let status = wheel.status();
    assert!(status.is_over());
    assert_eq!(
        status.result,
        Some(Standing::Tie { teams: teams(&["A", "B"]), score: 10 })
    );
    assert!(status.to_string().contains("GAME OVER!"));
    assert!(status.to_string().contains("Tie between: A, B with 10 points!"));
}

/// Test both boundaries of the round limit.
#[test]
fn test_round_limit_boundary() {
    let mut config = GameConfig::default();
    config.set_max_rounds(3).unwrap();

    let mut state = GameState::new(teams(&["A", "B"]), 10, 3);
    assert!(!is_game_over(&config, &state)); // round == max

    state.advance_round().unwrap();
    assert!(is_game_over(&config, &state)); // round == max + 1
}

/// Test that reaching the points cap ends the game with a winner.
#[test]
fn test_points_cap_ends_game() {
    let mut config = GameConfig::default();
    config.set_max_points(20).unwrap();
    config
        .set_wheel_options(vec![WheelOption::new("+5 points", "add_fixed:5", 1)])
        .unwrap();
    let mut state = GameState::new(teams(&["A", "B"]), 10, 1);
    let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(3));

    let mut spins = 0;
    while !wheel.is_game_over() {
        wheel.spin_and_resolve(None).unwrap();
        wheel.advance_turn().unwrap();
        spins += 1;
    }

    // A reaches 20 on its second spin, the third spin overall
    assert_eq!(spins, 3);
    assert_eq!(wheel.state().score("A"), Some(20));
    assert_eq!(
        wheel.status().result,
        Some(Standing::Winner { team: "A".to_string(), score: 20 })
    );
}

/// Test a full saved game played across several "invocations".
#[test]
fn test_game_survives_restarts() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let state_path = dir.path().join("game_state.json");

    let mut store = ConfigStore::open(&config_path).unwrap();
    store.update_max_rounds(2).unwrap();
    let config = ConfigStore::open(&config_path).unwrap().config().clone();

    GameState::create(
        config.teams().to_vec(),
        config.starting_points(),
        config.starting_round(),
        &state_path,
    )
    .unwrap();

    let mut seed = 0;
    loop {
        // Each pass reloads from disk, like a separate command
        let mut state = GameState::load(&state_path).unwrap();
        let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(seed));
        seed += 1;

        if wheel.is_game_over() {
            break;
        }
        wheel.spin_and_resolve(None).unwrap();
        if wheel.advance_turn().unwrap() == config.teams()[0] {
            wheel.advance_round().unwrap();
        }
    }

    let state = GameState::load(&state_path).unwrap();
    assert_eq!(state.current_round(), 3);
    assert_eq!(state.events().len(), 4); // 2 teams x 2 rounds
    assert_eq!(state.round_events(Some(1)).len(), 2);
    assert_eq!(state.round_events(Some(2)).len(), 2);

    // Scores are exactly the clamped replay of the recorded requests
    let mut replay = GameState::new(config.teams().to_vec(), config.starting_points(), 1);
    for event in state.events() {
        replay
            .apply_score_changes(&event.score_changes, &event.team, &event.action, &event.description)
            .unwrap();
    }
    assert_eq!(replay.scores(), state.scores());
}

/// Test that spinning for a named team leaves the turn alone.
#[test]
fn test_spin_for_named_team() {
    let config = GameConfig::default();
    let mut state = GameState::new(teams(&["Red", "Blue", "Green"]), 10, 1);
    let mut wheel = GameWheel::new(&config, &mut state, GameRng::new(11));

    let (_, team) = wheel.spin_and_resolve(Some("Green")).unwrap();

    assert_eq!(team, "Green");
    assert_eq!(wheel.state().current_team(), "Red");
    assert_eq!(wheel.state().events()[0].team, "Green");
}

/// Test choosing a random first team.
#[test]
fn test_random_starting_team() {
    let names = teams(&["Red", "Blue", "Green"]);
    let mut rng = GameRng::new(8);
    let mut state = GameState::new(names.clone(), 10, 1);

    let first = pick_random_starting_team(&names, &mut rng).unwrap();
    state.set_current_team(first).unwrap();

    assert_eq!(state.current_team(), first);
    assert_eq!(state.events().len(), 1);
    assert_eq!(state.events()[0].score_changes, ScoreChanges::new());
}
