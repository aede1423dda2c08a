//! Floor-by-floor run controller and the persisted run shape.
use crate::character::{Character, any_alive, build_party};
use crate::combat::{Encounter, EncounterReport};
use crate::config::RunConfig;
use crate::constants::MAX_LEVEL;
use crate::dice::Dice;
use crate::encounters::{FloorEvent, roll_floor_event};
use crate::enemy::{Enemy, EnemyKind};
use crate::event::{GameEvent, RunOutcome};
use crate::frontend::{Frontend, FrontendClosed};
use crate::items::Inventory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that survives between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub floor: u32,
    pub party: Vec<Character>,
    pub inventory: Inventory,
}

/// Problems with persisted run data.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is not valid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("floor {floor} outside 1..={max}")]
    FloorOutOfRange { floor: u32, max: u32 },
    #[error("saved party has {size} members (expected 1..={max})")]
    PartySize { size: usize, max: usize },
    #[error("party member {index} has an empty name")]
    EmptyName { index: usize },
    #[error("{name} has level {level} outside 1..={MAX_LEVEL}")]
    LevelOutOfRange { name: String, level: u32 },
    #[error("{name} has {pool} {value} above its maximum {max}")]
    PoolOverflow {
        name: String,
        pool: &'static str,
        value: u32,
        max: u32,
    },
}

impl RunState {
    /// Fresh state on the first floor.
    #[must_use]
    pub const fn new(party: Vec<Character>, inventory: Inventory) -> Self {
        Self {
            floor: 1,
            party,
            inventory,
        }
    }

    /// Decode a saved run. Call [`RunState::validate`] before trusting it.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::Json` when the document does not match the save shape.
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as pretty JSON with names left unescaped.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants a loaded state must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self, cfg: &RunConfig) -> Result<(), SaveError> {
        if !(1..=cfg.final_floor).contains(&self.floor) {
            return Err(SaveError::FloorOutOfRange {
                floor: self.floor,
                max: cfg.final_floor,
            });
        }
        if self.party.is_empty() || self.party.len() > cfg.party_size {
            return Err(SaveError::PartySize {
                size: self.party.len(),
                max: cfg.party_size,
            });
        }
        for (index, member) in self.party.iter().enumerate() {
            if member.name.trim().is_empty() {
                return Err(SaveError::EmptyName { index: index + 1 });
            }
            if !(1..=MAX_LEVEL).contains(&member.level) {
                return Err(SaveError::LevelOutOfRange {
                    name: member.name.clone(),
                    level: member.level,
                });
            }
            for (pool, value, max) in [
                ("hp", member.hp, member.stats.hp),
                ("mp", member.mp, member.stats.mp),
            ] {
                if value > max {
                    return Err(SaveError::PoolOverflow {
                        name: member.name.clone(),
                        pool,
                        value,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn party_alive(&self) -> bool {
        any_alive(&self.party)
    }
}

/// Ask the driver for a roster until it produces a valid one.
///
/// # Errors
///
/// Returns `FrontendClosed` if the driver stops answering.
pub fn new_run<F: Frontend + ?Sized>(
    cfg: &RunConfig,
    frontend: &mut F,
) -> Result<RunState, FrontendClosed> {
    let party = loop {
        let roster = frontend.request_party_creation(cfg.party_size)?;
        match build_party(roster, cfg.party_size) {
            Ok(party) => break party,
            Err(err) => frontend.notify(&GameEvent::PartyRejected {
                reason: err.to_string(),
            }),
        }
    };
    frontend.notify(&GameEvent::RunStarted {
        party: party.iter().map(|c| c.name.clone()).collect(),
    });
    Ok(RunState::new(party, cfg.starting_inventory()))
}

/// Result of processing one floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorStep {
    /// The floor was survived; the run continues on `next_floor`.
    Advanced { next_floor: u32 },
    Finished(RunOutcome),
}

/// Drives floors in order. Sole writer of the current floor.
#[derive(Debug, Clone)]
pub struct RunController {
    cfg: RunConfig,
    state: RunState,
    outcome: Option<RunOutcome>,
}

impl RunController {
    #[must_use]
    pub const fn new(state: RunState, cfg: RunConfig) -> Self {
        Self {
            cfg,
            state,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> RunState {
        self.state
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Process the current floor's event.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver stops answering mid-floor.
    pub fn step<F, D>(&mut self, frontend: &mut F, dice: &mut D) -> Result<FloorStep, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        if let Some(outcome) = self.outcome {
            return Ok(FloorStep::Finished(outcome));
        }
        let floor = self.state.floor;
        frontend.notify(&GameEvent::FloorEntered { floor });

        match roll_floor_event(floor, &self.cfg, dice) {
            FloorEvent::Battle { enemy } => {
                self.fight(enemy.spawn(), frontend, dice)?;
            }
            FloorEvent::Treasure { item } => {
                self.state.inventory.add(item, 1);
                frontend.notify(&GameEvent::TreasureFound { item });
            }
            FloorEvent::Rest => {
                for member in self.state.party.iter_mut().filter(|c| c.hp > 0) {
                    member.hp = member.stats.hp;
                }
                frontend.notify(&GameEvent::Rested);
            }
            FloorEvent::Boss => {
                self.fight(EnemyKind::DungeonBoss.spawn(), frontend, dice)?;
                let outcome = if self.state.party_alive() {
                    RunOutcome::Victory
                } else {
                    RunOutcome::Defeat
                };
                return Ok(self.finish(outcome, frontend));
            }
        }

        if !self.state.party_alive() {
            return Ok(self.finish(RunOutcome::Defeat, frontend));
        }
        self.state.floor += 1;
        Ok(FloorStep::Advanced {
            next_floor: self.state.floor,
        })
    }

    /// Process floors until the run ends.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver stops answering.
    pub fn run_to_end<F, D>(&mut self, frontend: &mut F, dice: &mut D) -> Result<RunOutcome, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        loop {
            if let FloorStep::Finished(outcome) = self.step(frontend, dice)? {
                return Ok(outcome);
            }
        }
    }

    fn fight<F, D>(
        &mut self,
        enemy: Enemy,
        frontend: &mut F,
        dice: &mut D,
    ) -> Result<EncounterReport, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        Encounter::new(
            &mut self.state.party,
            &mut self.state.inventory,
            enemy,
            self.cfg.escape_chance(),
        )
        .run(frontend, dice)
    }

    fn finish<F: Frontend + ?Sized>(&mut self, outcome: RunOutcome, frontend: &mut F) -> FloorStep {
        log::debug!("run finished on floor {}: {outcome:?}", self.state.floor);
        self.outcome = Some(outcome);
        frontend.notify(&GameEvent::RunFinished { outcome });
        FloorStep::Finished(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ActionChoice;
    use crate::dice::ScriptedDice;
    use crate::frontend::ScriptedFrontend;
    use crate::stats::Job;

    fn party() -> Vec<Character> {
        vec![
            Character::new("アレン", Job::Warrior),
            Character::new("セラ", Job::Priest),
            Character::new("ミナ", Job::Mage),
            Character::new("ロイ", Job::Thief),
        ]
    }

    #[test]
    fn treasure_and_rest_floors_advance() {
        let mut state = RunState::new(party(), Inventory::starting());
        state.party[0].hp = 3;
        state.party[1].hp = 0;
        let mut controller = RunController::new(state, RunConfig::default());
        let mut frontend = ScriptedFrontend::new();
        let mut dice = ScriptedDice::new().units([0.85, 0.95]);

        assert_eq!(
            controller.step(&mut frontend, &mut dice),
            Ok(FloorStep::Advanced { next_floor: 2 })
        );
        assert_eq!(
            controller
                .state()
                .inventory
                .count(crate::items::ItemId::Potion),
            3
        );
        assert_eq!(
            controller.step(&mut frontend, &mut dice),
            Ok(FloorStep::Advanced { next_floor: 3 })
        );
        let state = controller.state();
        assert_eq!(state.party[0].hp, 30);
        // fallen members stay down
        assert_eq!(state.party[1].hp, 0);
    }

    #[test]
    fn new_run_reprompts_until_roster_is_valid() {
        let cfg = RunConfig::default();
        let mut frontend = ScriptedFrontend::new()
            .roster(vec![("A".into(), Job::Warrior)])
            .roster(vec![
                ("A".into(), Job::Warrior),
                ("B".into(), Job::Priest),
                ("C".into(), Job::Mage),
                ("D".into(), Job::Artificer),
            ]);
        let state = new_run(&cfg, &mut frontend).unwrap();
        assert_eq!(state.floor, 1);
        assert_eq!(state.party.len(), 4);
        assert_eq!(state.inventory, Inventory::starting());
        assert!(matches!(
            frontend.events()[0],
            GameEvent::PartyRejected { .. }
        ));
    }

    #[test]
    fn wipe_on_an_early_floor_stops_the_run() {
        let mut state = RunState::new(party(), Inventory::empty());
        for member in &mut state.party {
            member.hp = 1;
        }
        let mut controller = RunController::new(state, RunConfig::default());
        let mut frontend = ScriptedFrontend::new().always(ActionChoice::Attack);
        // a wolf outlasts four one-HP members, felling one per round
        let mut dice = ScriptedDice::new()
            .units([0.1])
            .picks([2])
            .always_pick(0)
            .always_variation(1.08);
        let outcome = controller.run_to_end(&mut frontend, &mut dice).unwrap();
        assert_eq!(outcome, RunOutcome::Defeat);
        assert_eq!(controller.state().floor, 1);
        assert_eq!(
            controller.step(&mut frontend, &mut dice),
            Ok(FloorStep::Finished(RunOutcome::Defeat))
        );
        assert!(
            !frontend
                .events()
                .contains(&GameEvent::RunFinished {
                    outcome: RunOutcome::Victory
                })
        );
    }

    #[test]
    fn validate_rejects_broken_saves() {
        let cfg = RunConfig::default();
        let mut state = RunState::new(party(), Inventory::starting());
        assert!(state.validate(&cfg).is_ok());

        state.floor = 6;
        assert!(matches!(
            state.validate(&cfg),
            Err(SaveError::FloorOutOfRange { .. })
        ));
        state.floor = 2;
        state.party[0].hp = 99;
        assert!(matches!(
            state.validate(&cfg),
            Err(SaveError::PoolOverflow { pool: "hp", .. })
        ));
        state.party[0].hp = 1;
        state.party[2].level = 21;
        assert!(matches!(
            state.validate(&cfg),
            Err(SaveError::LevelOutOfRange { .. })
        ));
        state.party.clear();
        assert!(matches!(
            state.validate(&cfg),
            Err(SaveError::PartySize { size: 0, .. })
        ));
    }

    #[test]
    fn save_shape_matches_persisted_layout() {
        let state = RunState::new(party(), Inventory::starting());
        let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(json["floor"], 1);
        assert_eq!(json["party"][0]["name"], "アレン");
        assert_eq!(json["party"][0]["job"], "戦士");
        assert_eq!(json["party"][0]["stats"]["ATK"], 8);
        assert_eq!(json["inventory"]["火炎草"], 2);
        let back = RunState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(back, state);
        assert!(state.to_json().unwrap().contains("アレン"));
    }
}
