//! Delve Game Engine
//!
//! Platform-agnostic battle and progression core for the Delve dungeon crawler.
//! Front ends drive it through the [`Frontend`] trait and persist runs through
//! [`RunStorage`]; all randomness flows through [`Dice`].

pub mod character;
pub mod combat;
pub mod combatant;
pub mod config;
pub mod constants;
pub mod damage;
pub mod dice;
pub mod encounters;
pub mod enemy;
pub mod event;
pub mod frontend;
pub mod items;
pub mod numbers;
pub mod progression;
pub mod run;
pub mod stats;

// Re-export commonly used types
pub use character::{Character, PartyError, any_alive, build_party};
pub use combat::{
    ActionChoice, ActionRejected, ActionResult, Encounter, EncounterOutcome, EncounterReport,
    EscapeChance, resolve_action, turn_order,
};
pub use combatant::{Combatant, strike};
pub use config::{CheckpointPolicy, ConfigError, RunConfig};
pub use damage::{base_damage, compute_damage};
pub use dice::{Dice, ScriptedDice, SeededDice, derive_stream_seed};
pub use encounters::{FloorEvent, roll_floor_event};
pub use enemy::{Enemy, EnemyKind};
pub use event::{GameEvent, ItemEffect, RunOutcome};
pub use frontend::{BattleView, Frontend, FrontendClosed, ScriptedFrontend};
pub use items::{Inventory, ItemDef, ItemId, ItemKind, ItemTarget, UnknownItem};
pub use progression::{LEVEL_EXP, LevelUp, LevelUps, exp_threshold, exp_to_next_level};
pub use run::{FloorStep, RunController, RunState, SaveError, new_run};
pub use stats::{EnemyStats, Job, Stats, UnknownJob};

use thiserror::Error;

/// Trait for abstracting save/load operations.
/// Platform-specific implementations should provide this
pub trait RunStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save run state
    ///
    /// # Errors
    ///
    /// Returns an error if the run state cannot be saved.
    fn save_run(&self, slot: &str, state: &RunState) -> Result<(), Self::Error>;

    /// Load run state
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be read or decoded.
    fn load_run(&self, slot: &str) -> Result<Option<RunState>, Self::Error>;

    /// Delete a saved run
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_run(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Why [`GameEngine::play`] stopped before the run finished.
#[derive(Debug, Error)]
pub enum PlayError<E> {
    #[error(transparent)]
    Closed(#[from] FrontendClosed),
    #[error("failed to save run: {0}")]
    Storage(#[source] E),
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: RunState,
    /// Checkpoints written during the run, the victory save included.
    pub saves: u32,
}

/// Main game engine for managing runs
pub struct GameEngine<S>
where
    S: RunStorage,
{
    storage: S,
    config: RunConfig,
}

impl<S> GameEngine<S>
where
    S: RunStorage,
{
    /// Create a new engine over the provided storage
    pub const fn new(storage: S, config: RunConfig) -> Self {
        Self { storage, config }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load and validate a saved run. Missing, unreadable, and invalid saves
    /// all count as no save.
    #[must_use]
    pub fn load_run(&self, slot: &str) -> Option<RunState> {
        match self.storage.load_run(slot) {
            Ok(Some(state)) => match state.validate(&self.config) {
                Ok(()) => Some(state),
                Err(err) => {
                    log::warn!("ignoring invalid save in {slot}: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("ignoring unreadable save in {slot}: {err}");
                None
            }
        }
    }

    /// Resume from `slot` when asked to and a usable save exists, otherwise
    /// build a new party.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if party creation is abandoned.
    pub fn start_run<F: Frontend + ?Sized>(
        &self,
        slot: &str,
        resume: bool,
        frontend: &mut F,
    ) -> Result<RunState, FrontendClosed> {
        if resume {
            if let Some(state) = self.load_run(slot) {
                frontend.notify(&GameEvent::RunLoaded { floor: state.floor });
                return Ok(state);
            }
            frontend.notify(&GameEvent::NoSaveFound);
        }
        new_run(&self.config, frontend)
    }

    /// Play `state` to the end, checkpointing per the configured policy.
    ///
    /// # Errors
    ///
    /// Returns `PlayError::Closed` if the driver leaves mid-run and
    /// `PlayError::Storage` if a checkpoint cannot be written.
    pub fn play<F, D>(
        &self,
        slot: &str,
        state: RunState,
        frontend: &mut F,
        dice: &mut D,
    ) -> Result<RunReport, PlayError<S::Error>>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        let mut controller = RunController::new(state, self.config.clone());
        let mut saves = 0;
        let outcome = loop {
            match controller.step(frontend, dice)? {
                FloorStep::Advanced { next_floor } => {
                    if self.config.checkpoint == CheckpointPolicy::EveryFloor {
                        self.checkpoint(slot, controller.state(), frontend)?;
                        saves += 1;
                        log::debug!("checkpoint before floor {next_floor}");
                    }
                }
                FloorStep::Finished(outcome) => break outcome,
            }
        };
        if outcome == RunOutcome::Victory {
            self.checkpoint(slot, controller.state(), frontend)?;
            saves += 1;
        }
        Ok(RunReport {
            outcome,
            state: controller.into_state(),
            saves,
        })
    }

    /// Remove the save in `slot`.
    ///
    /// # Errors
    ///
    /// Returns the storage error if deletion fails.
    pub fn delete_run(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_run(slot)
    }

    fn checkpoint<F: Frontend + ?Sized>(
        &self,
        slot: &str,
        state: &RunState,
        frontend: &mut F,
    ) -> Result<(), PlayError<S::Error>> {
        self.storage
            .save_run(slot, state)
            .map_err(PlayError::Storage)?;
        frontend.notify(&GameEvent::CheckpointSaved { floor: state.floor });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Error)]
    #[error("decode failed: {0}")]
    struct FixtureError(String);

    /// Keeps raw JSON so corrupt saves can be planted.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, String>>>,
    }

    impl MemoryStorage {
        fn plant(&self, slot: &str, raw: &str) {
            self.saves
                .borrow_mut()
                .insert(slot.to_string(), raw.to_string());
        }
    }

    impl RunStorage for MemoryStorage {
        type Error = FixtureError;

        fn save_run(&self, slot: &str, state: &RunState) -> Result<(), Self::Error> {
            let json = state
                .to_json()
                .map_err(|err| FixtureError(err.to_string()))?;
            self.saves.borrow_mut().insert(slot.to_string(), json);
            Ok(())
        }

        fn load_run(&self, slot: &str) -> Result<Option<RunState>, Self::Error> {
            self.saves
                .borrow()
                .get(slot)
                .map(|raw| RunState::from_json(raw).map_err(|err| FixtureError(err.to_string())))
                .transpose()
        }

        fn delete_run(&self, slot: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(slot);
            Ok(())
        }
    }

    fn roster() -> Vec<(String, Job)> {
        vec![
            ("アレン".into(), Job::Warrior),
            ("セラ".into(), Job::Priest),
            ("ミナ".into(), Job::Mage),
            ("ロイ".into(), Job::Spellblade),
        ]
    }

    #[test]
    fn corrupt_and_missing_saves_fall_back_to_new_run() {
        let storage = MemoryStorage::default();
        storage.plant("broken", "{ not json");
        let engine = GameEngine::new(storage, RunConfig::default());
        assert!(engine.load_run("broken").is_none());
        assert!(engine.load_run("missing").is_none());

        let mut frontend = ScriptedFrontend::new().roster(roster());
        let state = engine.start_run("broken", true, &mut frontend).unwrap();
        assert_eq!(state.floor, 1);
        assert_eq!(frontend.events()[0], GameEvent::NoSaveFound);
    }

    #[test]
    fn invalid_saves_are_ignored() {
        let storage = MemoryStorage::default();
        let engine = GameEngine::new(storage.clone(), RunConfig::default());
        let mut state = RunState::new(build_party(roster(), 4).unwrap(), Inventory::starting());
        state.floor = 9;
        storage.plant("slot", &state.to_json().unwrap());
        assert!(engine.load_run("slot").is_none());
    }

    #[test]
    fn resume_returns_saved_state() {
        let storage = MemoryStorage::default();
        let engine = GameEngine::new(storage, RunConfig::default());
        let mut state = RunState::new(build_party(roster(), 4).unwrap(), Inventory::empty());
        state.floor = 4;
        engine.storage().save_run("slot", &state).unwrap();

        let mut frontend = ScriptedFrontend::new();
        let resumed = engine.start_run("slot", true, &mut frontend).unwrap();
        assert_eq!(resumed, state);
        assert_eq!(frontend.events(), &[GameEvent::RunLoaded { floor: 4 }]);
    }

    #[test]
    fn defeat_is_never_saved() {
        let engine = GameEngine::new(MemoryStorage::default(), RunConfig::default());
        let mut state = RunState::new(build_party(roster(), 4).unwrap(), Inventory::empty());
        state.floor = 5;
        for member in &mut state.party {
            member.hp = 1;
        }
        let mut frontend = ScriptedFrontend::new().always(ActionChoice::Attack);
        let mut dice = ScriptedDice::new().always_pick(0).always_variation(1.0);
        let report = engine
            .play("slot", state, &mut frontend, &mut dice)
            .unwrap();
        assert_eq!(report.outcome, RunOutcome::Defeat);
        assert_eq!(report.saves, 0);
        assert!(engine.load_run("slot").is_none());
    }

    #[test]
    fn every_floor_policy_checkpoints_each_cleared_floor() {
        let cfg = RunConfig {
            checkpoint: CheckpointPolicy::EveryFloor,
            final_floor: 3,
            ..RunConfig::default()
        };
        let engine = GameEngine::new(MemoryStorage::default(), cfg);
        let state = RunState::new(build_party(roster(), 4).unwrap(), Inventory::empty());
        let mut frontend = ScriptedFrontend::new().always(ActionChoice::Attack);
        // two rest floors, then the boss
        let mut dice = ScriptedDice::new()
            .units([0.95, 0.95])
            .always_pick(0)
            .always_variation(1.0);
        let report = engine
            .play("slot", state, &mut frontend, &mut dice)
            .unwrap();
        assert_eq!(report.outcome, RunOutcome::Victory);
        assert_eq!(report.saves, 3);
        let checkpoints: Vec<u32> = frontend
            .events()
            .iter()
            .filter_map(|event| match event {
                GameEvent::CheckpointSaved { floor } => Some(*floor),
                _ => None,
            })
            .collect();
        assert_eq!(checkpoints, vec![2, 3, 3]);
        assert_eq!(engine.load_run("slot").map(|s| s.floor), Some(3));
    }
}
