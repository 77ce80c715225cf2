//! Mode and battle configuration.
//!
//! Plain structs with defaults; `from_env` reads `ARENA_*` overrides and rejects
//! values that do not parse.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modes::ModeKind;
use crate::types::TICK_MS;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Opponent strength preset for the heuristic policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

/// Who sits on the other side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    /// Embedded opponent simulator.
    #[default]
    Simulated,
    /// A peer reached through the injected transport.
    Remote,
}

impl OpponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentKind::Simulated => "ai",
            OpponentKind::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub opponent: OpponentKind,
    pub difficulty: Difficulty,
    /// Scales the base attack before bonuses.
    pub garbage_multiplier: f64,
    /// Applied to the next outgoing attack after receiving one.
    pub counter_multiplier: f64,
    pub attack_delay_ms: u64,
    /// Most rows a single delivery can push.
    pub garbage_capacity: u32,
    pub opponent_update_ms: u64,
    /// Primary ticks between opponent gravity steps.
    pub opponent_gravity_ticks: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            opponent: OpponentKind::Simulated,
            difficulty: Difficulty::Medium,
            garbage_multiplier: 1.0,
            counter_multiplier: 1.5,
            attack_delay_ms: 500,
            garbage_capacity: 20,
            opponent_update_ms: 100,
            opponent_gravity_ticks: 60,
        }
    }
}

impl BattleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("garbage_multiplier", self.garbage_multiplier),
            ("counter_multiplier", self.counter_multiplier),
            ("opponent_update_ms", self.opponent_update_ms as f64),
            ("opponent_gravity_ticks", self.opponent_gravity_ticks as f64),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

/// Everything needed to construct a [`ModeEngine`](crate::ModeEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Registry name as requested (`"marathon"`, `"sprint"`, ...).
    pub mode: String,
    pub seed: u32,
    pub tick_ms: u32,
    /// Overrides the mode's default start level.
    pub start_level: Option<u32>,
    pub battle: BattleConfig,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            mode: "classic".to_string(),
            seed: 1,
            tick_ms: TICK_MS,
            start_level: None,
            battle: BattleConfig::default(),
        }
    }
}

impl ModeConfig {
    pub fn new(mode: impl Into<String>, seed: u32) -> Self {
        Self {
            mode: mode.into(),
            seed,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> ModeKind {
        ModeKind::from_name(&self.mode)
    }

    /// Read overrides from the process environment.
    ///
    /// `ARENA_MODE`, `ARENA_SEED`, `ARENA_START_LEVEL`, `ARENA_DIFFICULTY`,
    /// `ARENA_OPPONENT` (`ai` | `remote`), `ARENA_ATTACK_DELAY_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ModeConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(mode) = var("ARENA_MODE") {
            config.mode = mode;
        }
        if let Some(seed) = var("ARENA_SEED") {
            config.seed = parse("ARENA_SEED", &seed)?;
        }
        if let Some(level) = var("ARENA_START_LEVEL") {
            config.start_level = Some(parse("ARENA_START_LEVEL", &level)?);
        }
        if let Some(delay) = var("ARENA_ATTACK_DELAY_MS") {
            config.battle.attack_delay_ms = parse("ARENA_ATTACK_DELAY_MS", &delay)?;
        }
        if let Some(difficulty) = var("ARENA_DIFFICULTY") {
            config.battle.difficulty =
                difficulty
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: "ARENA_DIFFICULTY",
                        value: difficulty.clone(),
                    })?;
        }
        if let Some(opponent) = var("ARENA_OPPONENT") {
            config.battle.opponent = match opponent.to_lowercase().as_str() {
                "ai" | "simulated" => OpponentKind::Simulated,
                "remote" | "peer" => OpponentKind::Remote,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "ARENA_OPPONENT",
                        value: opponent,
                    })
                }
            };
        }

        config.battle.validate()?;
        Ok(config)
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}
