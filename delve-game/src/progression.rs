//! Experience thresholds and level growth.
use crate::character::Character;
use crate::constants::{LEVEL_EXP_STEP, LEVEL_UP_GROWTH, MAX_LEVEL};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const TABLE_LEN: usize = MAX_LEVEL as usize + 1;

const fn build_level_table() -> [u32; TABLE_LEN] {
    let mut table = [0u32; TABLE_LEN];
    let mut level = 1;
    while level < TABLE_LEN {
        table[level] = table[level - 1] + (level as u32) * LEVEL_EXP_STEP;
        level += 1;
    }
    table
}

/// Cumulative experience thresholds, indexed by the level being left.
///
/// A character at level `n` advances once `exp >= LEVEL_EXP[n]`.
pub const LEVEL_EXP: [u32; TABLE_LEN] = build_level_table();

/// One level gained, reported to the caller for notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub name: String,
    pub level: u32,
}

pub type LevelUps = SmallVec<[LevelUp; 2]>;

/// Threshold a character at `level` must reach to advance, if any.
#[must_use]
pub fn exp_threshold(level: u32) -> Option<u32> {
    if level >= MAX_LEVEL {
        return None;
    }
    usize::try_from(level)
        .ok()
        .and_then(|idx| LEVEL_EXP.get(idx).copied())
}

/// Experience still needed for the next level, `None` at the cap.
#[must_use]
pub fn exp_to_next_level(character: &Character) -> Option<u32> {
    exp_threshold(character.level).map(|needed| needed.saturating_sub(character.exp))
}

/// Apply every level-up the character's experience has earned.
///
/// Each level adds the flat growth to all eight stats and fully restores
/// hit and magic points.
pub fn level_up_if_ready(character: &mut Character) -> LevelUps {
    let mut gained = LevelUps::new();
    while let Some(needed) = exp_threshold(character.level) {
        if character.exp < needed {
            break;
        }
        character.level += 1;
        character.stats.grow(LEVEL_UP_GROWTH);
        character.restore();
        gained.push(LevelUp {
            name: character.name.clone(),
            level: character.level,
        });
    }
    gained
}
