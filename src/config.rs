//! Configuration management with validation and defaults.
//!
//! Round timing, betting bounds, payout multipliers, and history retention
//! are all tunable here; the engine never hardcodes them.

use crate::errors::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Top-level engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub round: RoundConfig,
    pub betting: BettingConfig,
    pub payout: PayoutConfig,
    pub history: HistoryConfig,
}

/// Round timing configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Full round duration in seconds.
    pub duration_secs: u64,
    /// Bets are rejected once remaining seconds drop to this window.
    pub lock_window_secs: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            lock_window_secs: 5,
        }
    }
}

/// Stake bounds for a single bet.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BettingConfig {
    pub min_bet: u64,
    pub max_bet: u64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_bet: 10,
            max_bet: 10_000,
        }
    }
}

/// Fixed payout multiplier table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    /// Exact number match.
    pub number_multiplier: u64,
    /// Red or Green color match.
    pub color_multiplier: u64,
    /// Violet color match.
    pub violet_multiplier: u64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            number_multiplier: 9,
            color_multiplier: 2,
            violet_multiplier: 5,
        }
    }
}

/// Retention of recently drawn outcomes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub recent_results: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { recent_results: 50 }
    }
}

impl GameConfig {
    /// Short rounds for tests and local demos.
    pub fn fast_rounds() -> Self {
        Self {
            round: RoundConfig {
                duration_secs: 10,
                lock_window_secs: 2,
            },
            ..Default::default()
        }
    }

    /// Validate logical consistency before the engine starts.
    pub fn validate(&self) -> GameResult<()> {
        if self.round.duration_secs == 0 {
            return Err(GameError::Configuration(
                "round.duration_secs must be > 0".to_string(),
            ));
        }
        if self.round.lock_window_secs >= self.round.duration_secs {
            return Err(GameError::Configuration(format!(
                "lock window ({}) must be shorter than round duration ({})",
                self.round.lock_window_secs, self.round.duration_secs
            )));
        }
        if self.betting.min_bet == 0 {
            return Err(GameError::Configuration(
                "betting.min_bet must be > 0".to_string(),
            ));
        }
        if self.betting.min_bet > self.betting.max_bet {
            return Err(GameError::Configuration(format!(
                "betting.min_bet ({}) exceeds betting.max_bet ({})",
                self.betting.min_bet, self.betting.max_bet
            )));
        }
        if self.payout.number_multiplier == 0
            || self.payout.color_multiplier == 0
            || self.payout.violet_multiplier == 0
        {
            return Err(GameError::Configuration(
                "payout multipliers must be > 0".to_string(),
            ));
        }
        if self.history.recent_results == 0 {
            return Err(GameError::Configuration(
                "history.recent_results must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(self.round.duration_secs)
    }

    pub fn lock_window(&self) -> Duration {
        Duration::from_secs(self.round.lock_window_secs)
    }
}

/// Loads configuration from an optional TOML file plus environment overrides.
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load, apply `COLORWIN_*` environment overrides, and validate.
    pub fn load(&self) -> GameResult<GameConfig> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => GameConfig::default(),
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &str) -> GameResult<GameConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GameError::Configuration(format!("failed to read {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| GameError::Configuration(format!("failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(config: &mut GameConfig) -> GameResult<()> {
        if let Ok(secs) = env::var("COLORWIN_ROUND_DURATION_SECS") {
            config.round.duration_secs = Self::parse_var("COLORWIN_ROUND_DURATION_SECS", &secs)?;
        }
        if let Ok(secs) = env::var("COLORWIN_LOCK_WINDOW_SECS") {
            config.round.lock_window_secs = Self::parse_var("COLORWIN_LOCK_WINDOW_SECS", &secs)?;
        }
        if let Ok(amount) = env::var("COLORWIN_MIN_BET") {
            config.betting.min_bet = Self::parse_var("COLORWIN_MIN_BET", &amount)?;
        }
        if let Ok(amount) = env::var("COLORWIN_MAX_BET") {
            config.betting.max_bet = Self::parse_var("COLORWIN_MAX_BET", &amount)?;
        }
        Ok(())
    }

    fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> GameResult<T> {
        value.parse().map_err(|_| {
            GameError::Configuration(format!("invalid value for {}: '{}'", name, value))
        })
    }
}
