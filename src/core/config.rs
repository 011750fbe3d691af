//! Game configuration: wheel options and game limits.
//!
//! `GameConfig` is a plain value passed by reference to whoever needs it.
//! Every setter validates before changing anything. `ConfigStore` binds a
//! config to a JSON file and persists after every successful update.
//!
//! Missing keys in the file fall back to defaults, so older or hand-trimmed
//! config files keep working.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::action::ActionSpec;
use super::persist::{SnapshotError, SnapshotFile};

/// One slice of the wheel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelOption {
    /// Text shown when the wheel lands here.
    pub label: String,
    /// Action spec, `kind` or `kind:param`.
    pub action: String,
    /// Relative selection weight (> 0).
    pub weight: u32,
}

impl WheelOption {
    /// Create a wheel option.
    pub fn new(label: impl Into<String>, action: impl Into<String>, weight: u32) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            weight,
        }
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    wheel_options: Vec<WheelOption>,
    teams: Vec<String>,
    starting_points: i64,
    /// 0 means no cap.
    max_points: i64,
    max_rounds: u32,
    starting_round: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            wheel_options: default_wheel(),
            teams: vec!["Red".to_string(), "Blue".to_string()],
            starting_points: 10,
            max_points: 0,
            max_rounds: 20,
            starting_round: 1,
        }
    }
}

fn default_wheel() -> Vec<WheelOption> {
    vec![
        WheelOption::new("+5 points", "add_fixed:5", 3),
        WheelOption::new("+10 points", "add_fixed:10", 2),
        WheelOption::new("+15 points", "add_fixed:15", 1),
        WheelOption::new("-5 points", "add_fixed:-5", 2),
        WheelOption::new("-10 points", "add_fixed:-10", 1),
        WheelOption::new("Steal 5", "steal:5", 2),
        WheelOption::new("Steal 10", "steal:10", 1),
        WheelOption::new("Share +5 to all", "share_all:5", 2),
        WheelOption::new("Swap scores", "swap_random", 1),
        WheelOption::new("Double your score", "multiply:2", 1),
    ]
}

impl GameConfig {
    // === Queries ===

    /// Wheel options in configured order.
    #[must_use]
    pub fn wheel_options(&self) -> &[WheelOption] {
        &self.wheel_options
    }

    /// Default team names for a new game.
    #[must_use]
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Points every team starts with.
    #[must_use]
    pub fn starting_points(&self) -> i64 {
        self.starting_points
    }

    /// Points cap; 0 means no cap.
    #[must_use]
    pub fn max_points(&self) -> i64 {
        self.max_points
    }

    /// Last playable round.
    #[must_use]
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Round number a new game starts in.
    #[must_use]
    pub fn starting_round(&self) -> u32 {
        self.starting_round
    }

    // === Validated updates ===

    /// Replace the default team list (at least 2, unique).
    pub fn set_teams(&mut self, teams: Vec<String>) -> Result<(), ConfigError> {
        validate_teams(&teams)?;
        self.teams = teams;
        Ok(())
    }

    /// Set starting points (>= 0).
    pub fn set_starting_points(&mut self, points: i64) -> Result<(), ConfigError> {
        if points < 0 {
            return Err(ConfigError::Validation("starting points must be >= 0".to_string()));
        }
        self.starting_points = points;
        Ok(())
    }

    /// Set the points cap (>= 0, 0 disables it).
    pub fn set_max_points(&mut self, points: i64) -> Result<(), ConfigError> {
        if points < 0 {
            return Err(ConfigError::Validation("maximum points must be >= 0".to_string()));
        }
        self.max_points = points;
        Ok(())
    }

    /// Set the number of rounds (> 0).
    pub fn set_max_rounds(&mut self, rounds: u32) -> Result<(), ConfigError> {
        if rounds == 0 {
            return Err(ConfigError::Validation("maximum rounds must be > 0".to_string()));
        }
        self.max_rounds = rounds;
        Ok(())
    }

    /// Set the starting round (> 0).
    pub fn set_starting_round(&mut self, round: u32) -> Result<(), ConfigError> {
        if round == 0 {
            return Err(ConfigError::Validation("starting round must be > 0".to_string()));
        }
        self.starting_round = round;
        Ok(())
    }

    /// Replace the wheel.
    pub fn set_wheel_options(&mut self, options: Vec<WheelOption>) -> Result<(), ConfigError> {
        validate_wheel(&options)?;
        self.wheel_options = options;
        Ok(())
    }

    /// Check every constraint. Used after deserializing a file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_teams(&self.teams)?;
        validate_wheel(&self.wheel_options)?;
        if self.starting_points < 0 {
            return Err(ConfigError::Validation("starting points must be >= 0".to_string()));
        }
        if self.max_points < 0 {
            return Err(ConfigError::Validation("maximum points must be >= 0".to_string()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Validation("maximum rounds must be > 0".to_string()));
        }
        if self.starting_round == 0 {
            return Err(ConfigError::Validation("starting round must be > 0".to_string()));
        }
        Ok(())
    }
}

impl GameConfig {
    /// Build a config from the keys of a JSON object, defaulting missing keys.
    ///
    /// A present key with a value of the wrong type or range is a
    /// validation error naming that key; it never discards the other keys.
    fn from_fields(fields: serde_json::Map<String, serde_json::Value>) -> Result<Self, ConfigError> {
        let mut config = GameConfig::default();

        for (key, value) in fields {
            match key.as_str() {
                "wheel_options" => config.wheel_options = field(&key, value)?,
                "teams" => config.teams = field(&key, value)?,
                "starting_points" => config.starting_points = field(&key, value)?,
                "max_points" => config.max_points = field(&key, value)?,
                "max_rounds" => config.max_rounds = field(&key, value)?,
                "starting_round" => config.starting_round = field(&key, value)?,
                _ => log::debug!("Ignoring unknown config key '{key}'"),
            }
        }

        Ok(config)
    }
}

fn field<T: serde::de::DeserializeOwned>(key: &str, value: serde_json::Value) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|e| {
        if key == "wheel_options" {
            ConfigError::Validation(format!(
                "each wheel option must have 'label', 'action', and 'weight' > 0 ({e})"
            ))
        } else {
            ConfigError::Validation(format!("invalid value for '{key}': {e}"))
        }
    })
}

fn validate_teams(teams: &[String]) -> Result<(), ConfigError> {
    if teams.len() < 2 {
        return Err(ConfigError::Validation("must have at least 2 teams".to_string()));
    }
    let mut seen = FxHashSet::default();
    for team in teams {
        if !seen.insert(team.as_str()) {
            return Err(ConfigError::Validation(format!(
                "team names must be unique ('{team}' appears twice)"
            )));
        }
    }
    Ok(())
}

fn validate_wheel(options: &[WheelOption]) -> Result<(), ConfigError> {
    if options.is_empty() {
        return Err(ConfigError::Validation("must have at least one wheel option".to_string()));
    }
    for option in options {
        if option.label.is_empty() || option.action.is_empty() {
            return Err(ConfigError::Validation(
                "each wheel option must have 'label', 'action', and 'weight'".to_string(),
            ));
        }
        if option.weight == 0 {
            return Err(ConfigError::Validation(format!(
                "wheel option weights must be > 0 ('{}')",
                option.label
            )));
        }
    }
    Ok(())
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Current Game Configuration ===")?;
        writeln!(f)?;
        writeln!(f, "Teams: {}", self.teams.join(", "))?;
        writeln!(f, "Starting Points: {}", self.starting_points)?;
        if self.max_points == 0 {
            writeln!(f, "Maximum Points: No limit")?;
        } else {
            writeln!(f, "Maximum Points: {}", self.max_points)?;
        }
        writeln!(f, "Maximum Rounds: {}", self.max_rounds)?;
        writeln!(f, "Starting Round: {}", self.starting_round)?;
        writeln!(f)?;
        write!(f, "Wheel Options:")?;
        for (i, option) in self.wheel_options.iter().enumerate() {
            write!(f, "\n  {:2}. {} (weight: {})", i + 1, option.label, option.weight)?;
        }
        Ok(())
    }
}

/// A `GameConfig` bound to its JSON file.
///
/// Every successful `update_*` writes the file before returning. A failed
/// validation leaves both memory and disk untouched.
#[derive(Debug)]
pub struct ConfigStore {
    file: SnapshotFile,
    config: GameConfig,
}

impl ConfigStore {
    /// Load the config at `path`.
    ///
    /// - Missing file: defaults are used and written out.
    /// - Unreadable file, or text that is not a JSON object: defaults are
    ///   used, file left alone.
    /// - JSON object with a bad value for any key: `ConfigError::Validation`.
    ///   Missing keys take their defaults.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = SnapshotFile::new(path.as_ref());

        if !file.exists() {
            let store = Self {
                file,
                config: GameConfig::default(),
            };
            store.save()?;
            log::info!("Created default config at {}", store.path().display());
            return Ok(store);
        }

        let parsed = file
            .read()
            .map_err(|e| e.to_string())
            .and_then(|json| serde_json::from_str::<serde_json::Value>(&json).map_err(|e| e.to_string()))
            .and_then(|value| match value {
                serde_json::Value::Object(fields) => Ok(fields),
                _ => Err("top level is not an object".to_string()),
            });

        let config = match parsed {
            Ok(fields) => {
                let config = GameConfig::from_fields(fields)?;
                config.validate()?;
                config
            }
            Err(e) => {
                log::warn!(
                    "Error loading config file {}: {e}; using default configuration",
                    file.path().display()
                );
                GameConfig::default()
            }
        };

        for option in config.wheel_options() {
            if let Err(e) = ActionSpec::parse(&option.action) {
                log::warn!("Wheel option '{}' will fail when landed on: {e}", option.label);
            }
        }

        Ok(Self { file, config })
    }

    /// Wrap an existing config without touching disk.
    pub fn with_config(path: impl AsRef<Path>, config: GameConfig) -> Self {
        Self {
            file: SnapshotFile::new(path.as_ref()),
            config,
        }
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Write the current configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.file.write(&self.config)?;
        Ok(())
    }

    pub fn update_teams(&mut self, teams: Vec<String>) -> Result<(), ConfigError> {
        self.update(|config| config.set_teams(teams))
    }

    pub fn update_starting_points(&mut self, points: i64) -> Result<(), ConfigError> {
        self.update(|config| config.set_starting_points(points))
    }

    pub fn update_max_points(&mut self, points: i64) -> Result<(), ConfigError> {
        self.update(|config| config.set_max_points(points))
    }

    pub fn update_max_rounds(&mut self, rounds: u32) -> Result<(), ConfigError> {
        self.update(|config| config.set_max_rounds(rounds))
    }

    pub fn update_starting_round(&mut self, round: u32) -> Result<(), ConfigError> {
        self.update(|config| config.set_starting_round(round))
    }

    pub fn update_wheel_options(&mut self, options: Vec<WheelOption>) -> Result<(), ConfigError> {
        self.update(|config| config.set_wheel_options(options))
    }

    fn update(
        &mut self,
        apply: impl FnOnce(&mut GameConfig) -> Result<(), ConfigError>,
    ) -> Result<(), ConfigError> {
        apply(&mut self.config)?;
        self.save()?;
        log::info!("Configuration saved to {}", self.path().display());
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Config persistence error: {0}")]
    Persist(#[from] SnapshotError),
}
