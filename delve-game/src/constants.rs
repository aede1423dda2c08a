//! Fixed tuning values shared across the engine.

/// Highest level a character can reach.
pub const MAX_LEVEL: u32 = 20;

/// Number of characters in a freshly created party.
pub const PARTY_SIZE: usize = 4;

/// The boss waits on this floor.
pub const FINAL_FLOOR: u32 = 5;

/// Flat amount every stat gains per level.
pub const LEVEL_UP_GROWTH: u32 = 2;

/// Experience multiplier per level step of the progression table.
pub const LEVEL_EXP_STEP: u32 = 10;

/// Closed bounds of the per-attack damage multiplier.
pub const VARIATION_MIN: f64 = 0.92;
pub const VARIATION_MAX: f64 = 1.08;

/// Minimum pre-variation damage.
pub const MIN_BASE_DAMAGE: f64 = 1.0;

pub const ESCAPE_BASE_CHANCE: f64 = 0.25;
pub const ESCAPE_CHANCE_STEP: f64 = 0.25;

/// Floor event rolls below this value start a battle.
pub const BATTLE_THRESHOLD: f64 = 0.80;
/// Rolls at or above the battle threshold and below this value yield treasure.
pub const TREASURE_THRESHOLD: f64 = 0.90;

/// Copies of each catalog item a new run starts with.
pub const STARTING_ITEM_COUNT: u32 = 2;

/// Default save slot file name used by file-backed storage.
pub const DEFAULT_SAVE_FILE: &str = "savegame.json";
