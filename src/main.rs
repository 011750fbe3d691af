//! Review Wheel command line.
//!
//! Usage:
//!   review-wheel start Red Blue --points 10   - Start a new game
//!   review-wheel spin                         - Spin for the current team
//!   review-wheel next-round                   - Advance to the next round
//!   review-wheel status                       - Show scores and standings
//!   review-wheel history --round 2            - Show a round's events
//!   review-wheel load backup.json             - Resume from another save
//!   review-wheel config show                  - Show the configuration

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use review_wheel::{
    pick_random_starting_team, ConfigStore, GameConfig, GameRng, GameState, GameStatus,
    GameWheel, LoadError,
};

#[derive(Parser)]
#[command(name = "review-wheel", about = "Weighted prize wheel for team review games")]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Save file of the active game
    #[arg(short, long, global = true, default_value = "game_state.json")]
    state: PathBuf,

    /// Seed for reproducible spins
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game, replacing any saved one
    Start {
        /// Team names in turn order (defaults to the configured teams)
        teams: Vec<String>,
        /// Starting points for every team
        #[arg(short, long)]
        points: Option<i64>,
        /// Pick the first team at random
        #[arg(long)]
        random_start: bool,
    },
    /// Spin the wheel
    Spin {
        /// Spin for this team without passing the turn
        team: Option<String>,
    },
    /// Advance to the next round
    NextRound,
    /// Show the current game state
    Status,
    /// Show the events of a round
    History {
        /// Round number (defaults to the current round)
        #[arg(short, long)]
        round: Option<u32>,
    },
    /// Load a saved game into the active save file
    Load {
        /// Save file to load
        file: PathBuf,
    },
    /// Inspect or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the configuration
    Show,
    /// Change configuration values
    Set {
        /// Default team names
        #[arg(long, num_args = 2..)]
        teams: Option<Vec<String>>,
        #[arg(long)]
        starting_points: Option<i64>,
        /// Points cap, 0 to disable
        #[arg(long)]
        max_points: Option<i64>,
        #[arg(long)]
        max_rounds: Option<u32>,
        #[arg(long)]
        starting_round: Option<u32>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut store = ConfigStore::open(&cli.config)
        .with_context(|| format!("Failed to open config {}", cli.config.display()))?;
    let rng = cli.seed.map_or_else(GameRng::from_entropy, GameRng::new);
    log::debug!("Using RNG seed {}", rng.seed());

    match cli.command {
        Commands::Start { teams, points, random_start } => {
            start_game(store.config(), &cli.state, teams, points, random_start, rng)
        }
        Commands::Spin { team } => spin(store.config(), &cli.state, team, rng),
        Commands::NextRound => next_round(store.config(), &cli.state),
        Commands::Status => {
            let state = load_game(&cli.state)?;
            println!("{}", GameStatus::new(store.config(), &state));
            Ok(())
        }
        Commands::History { round } => {
            let state = load_game(&cli.state)?;
            println!("{}", state.round_history(round));
            Ok(())
        }
        Commands::Load { file } => {
            let mut state = GameState::load(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            state.bind_to(&cli.state)?;
            println!("Loaded game from {}", file.display());
            println!("{}", state.summary());
            Ok(())
        }
        Commands::Config { action } => configure(&mut store, action),
    }
}

fn start_game(
    config: &GameConfig,
    state_path: &Path,
    teams: Vec<String>,
    points: Option<i64>,
    random_start: bool,
    mut rng: GameRng,
) -> Result<()> {
    // Reuse config validation for the team list
    let mut settings = config.clone();
    if !teams.is_empty() {
        settings.set_teams(teams)?;
    }
    if let Some(points) = points {
        settings.set_starting_points(points)?;
    }

    let mut state = GameState::create(
        settings.teams().to_vec(),
        settings.starting_points(),
        settings.starting_round(),
        state_path,
    )?;

    if random_start {
        if let Some(first) = pick_random_starting_team(settings.teams(), &mut rng) {
            state.set_current_team(first)?;
        }
    }

    println!("New game started!");
    println!("{}", state.summary());
    Ok(())
}

fn spin(config: &GameConfig, state_path: &Path, team: Option<String>, rng: GameRng) -> Result<()> {
    let mut state = load_game(state_path)?;
    let mut wheel = GameWheel::new(config, &mut state, rng);

    if wheel.is_game_over() {
        println!("{}", wheel.status());
        return Ok(());
    }

    let (outcome, team_spun) = wheel.spin_and_resolve(team.as_deref())?;

    println!("{team_spun} spins the wheel...");
    println!("Landed on: {}", outcome.label);
    println!("{}", outcome.description);
    for (name, delta) in &outcome.score_changes {
        println!("  {name}: {delta:+}");
    }

    if team.is_none() {
        let next = wheel.advance_turn()?;
        println!("Next up: {next}");
    }

    println!();
    println!("{}", wheel.status());
    Ok(())
}

fn next_round(config: &GameConfig, state_path: &Path) -> Result<()> {
    let mut state = load_game(state_path)?;
    let round = state.advance_round()?;

    println!("Round {round} begins. {} spins first.", state.current_team());
    if review_wheel::is_game_over(config, &state) {
        println!("{}", GameStatus::new(config, &state));
    }
    Ok(())
}

fn configure(store: &mut ConfigStore, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show => {}
        ConfigCommand::Set {
            teams,
            starting_points,
            max_points,
            max_rounds,
            starting_round,
        } => {
            if let Some(teams) = teams {
                store.update_teams(teams)?;
            }
            if let Some(points) = starting_points {
                store.update_starting_points(points)?;
            }
            if let Some(points) = max_points {
                store.update_max_points(points)?;
            }
            if let Some(rounds) = max_rounds {
                store.update_max_rounds(rounds)?;
            }
            if let Some(round) = starting_round {
                store.update_starting_round(round)?;
            }
        }
    }

    println!("{}", store.config());
    Ok(())
}

fn load_game(path: &Path) -> Result<GameState> {
    match GameState::load(path) {
        Ok(state) => Ok(state),
        Err(LoadError::Absent(_)) => bail!("No game in progress. Start one with `review-wheel start`."),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}
