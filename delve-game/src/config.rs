//! Run configuration.
use crate::combat::EscapeChance;
use crate::constants::{
    BATTLE_THRESHOLD, ESCAPE_BASE_CHANCE, ESCAPE_CHANCE_STEP, FINAL_FLOOR, PARTY_SIZE,
    STARTING_ITEM_COUNT, TREASURE_THRESHOLD,
};
use crate::items::Inventory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_RUN_CONFIG: &str = include_str!("../data/run_config.json");

/// When the run state is written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// Only once the boss is defeated.
    #[default]
    OnVictory,
    /// After every cleared floor, and on victory.
    EveryFloor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub final_floor: u32,
    pub party_size: usize,
    pub starting_item_count: u32,
    pub battle_threshold: f64,
    pub treasure_threshold: f64,
    pub escape_base: f64,
    pub escape_step: f64,
    pub checkpoint: CheckpointPolicy,
}

/// Errors raised when run configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("battle threshold {battle:.2} exceeds treasure threshold {treasure:.2}")]
    ThresholdOrder { battle: f64, treasure: f64 },
    #[error("invalid config JSON: {0}")]
    Parse(String),
}

impl RunConfig {
    /// Configuration shipped with the crate, falling back to the coded default.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_RUN_CONFIG).unwrap_or_default()
    }

    const fn coded_default() -> Self {
        Self {
            final_floor: FINAL_FLOOR,
            party_size: PARTY_SIZE,
            starting_item_count: STARTING_ITEM_COUNT,
            battle_threshold: BATTLE_THRESHOLD,
            treasure_threshold: TREASURE_THRESHOLD,
            escape_base: ESCAPE_BASE_CHANCE,
            escape_step: ESCAPE_CHANCE_STEP,
            checkpoint: CheckpointPolicy::OnVictory,
        }
    }

    /// Parse and validate a JSON document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Ensure the configuration stays within its documented bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.final_floor < 1 {
            return Err(ConfigError::MinViolation {
                field: "final_floor",
                min: 1.0,
                value: f64::from(self.final_floor),
            });
        }
        if self.party_size < 1 {
            return Err(ConfigError::MinViolation {
                field: "party_size",
                min: 1.0,
                value: 0.0,
            });
        }
        for (field, value) in [
            ("battle_threshold", self.battle_threshold),
            ("treasure_threshold", self.treasure_threshold),
            ("escape_base", self.escape_base),
            ("escape_step", self.escape_step),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        if self.battle_threshold > self.treasure_threshold {
            return Err(ConfigError::ThresholdOrder {
                battle: self.battle_threshold,
                treasure: self.treasure_threshold,
            });
        }
        Ok(())
    }

    /// Escape chance every encounter starts from.
    #[must_use]
    pub const fn escape_chance(&self) -> EscapeChance {
        EscapeChance::new(self.escape_base, self.escape_step)
    }

    #[must_use]
    pub fn starting_inventory(&self) -> Inventory {
        Inventory::stocked(self.starting_item_count)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::coded_default()
    }
}
