//! Narrative events emitted for front ends.
//!
//! Events are purely observational. Nothing in the engine reads them back.
use crate::items::ItemId;
use serde::{Deserialize, Serialize};

/// Outcome of a single item use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ItemEffect {
    Healed { target: String, amount: u32 },
    Damaged { target: String, amount: u32 },
}

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    RunStarted {
        party: Vec<String>,
    },
    RunLoaded {
        floor: u32,
    },
    NoSaveFound,
    PartyRejected {
        reason: String,
    },
    FloorEntered {
        floor: u32,
    },
    TreasureFound {
        item: ItemId,
    },
    Rested,
    EncounterBegan {
        enemy: String,
        boss: bool,
    },
    EnemyAttacked {
        enemy: String,
        target: String,
        damage: u32,
    },
    CharacterFell {
        name: String,
    },
    CharacterAttacked {
        actor: String,
        enemy: String,
        damage: u32,
    },
    Defended {
        actor: String,
    },
    ItemUsed {
        actor: String,
        item: ItemId,
        effect: ItemEffect,
    },
    EscapeAttempted {
        actor: String,
        success: bool,
    },
    ActionRejected {
        actor: String,
        reason: String,
    },
    EnemyDefeated {
        enemy: String,
    },
    ExperienceGained {
        name: String,
        amount: u32,
    },
    LevelUp {
        name: String,
        level: u32,
    },
    PartyWiped,
    CheckpointSaved {
        floor: u32,
    },
    RunFinished {
        outcome: RunOutcome,
    },
}
