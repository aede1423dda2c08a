//! Floor event selection.
use crate::config::RunConfig;
use crate::dice::Dice;
use crate::enemy::EnemyKind;
use crate::items::ItemId;
use serde::{Deserialize, Serialize};

/// What waits on a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FloorEvent {
    Battle { enemy: EnemyKind },
    Treasure { item: ItemId },
    Rest,
    Boss,
}

/// Roll the event for `floor`. The final floor is always the boss and
/// consumes no draws.
pub fn roll_floor_event<D: Dice + ?Sized>(floor: u32, cfg: &RunConfig, dice: &mut D) -> FloorEvent {
    if floor >= cfg.final_floor {
        return FloorEvent::Boss;
    }
    let roll = dice.unit();
    debug_assert!(
        (0.0..1.0).contains(&roll),
        "floor event roll {roll} outside [0, 1)"
    );
    let event = if roll < cfg.battle_threshold {
        let enemy = EnemyKind::ROSTER[dice.pick(EnemyKind::ROSTER.len())];
        FloorEvent::Battle { enemy }
    } else if roll < cfg.treasure_threshold {
        FloorEvent::Treasure {
            item: ItemId::TREASURE,
        }
    } else {
        FloorEvent::Rest
    };
    log::debug!("floor {floor} roll {roll:.3} -> {event:?}");
    event
}
