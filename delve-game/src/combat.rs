//! Encounter resolution against a single enemy.
//!
//! A round orders the living party by agility, gives a faster (or equally
//! fast) enemy an opening attack, lets every character act once, then gives
//! the enemy its closing attack. Rounds repeat until the enemy falls, the
//! party is wiped, or someone escapes.
use crate::character::{Character, any_alive};
use crate::combatant::{Combatant, strike};
use crate::constants::{ESCAPE_BASE_CHANCE, ESCAPE_CHANCE_STEP};
use crate::dice::Dice;
use crate::enemy::Enemy;
use crate::event::{GameEvent, ItemEffect};
use crate::frontend::{BattleView, Frontend, FrontendClosed};
use crate::items::{Inventory, ItemId, ItemKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// What a character was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChoice {
    Attack,
    Defend,
    UseItem(ItemId),
    Escape,
}

/// What actually happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Attacked { damage: u32 },
    Defended,
    ItemUsed { item: ItemId, effect: ItemEffect },
    Escape { success: bool },
}

/// A choice that cannot be carried out; the same character chooses again.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ActionRejected {
    #[error("there are no items to use")]
    EmptyInventory,
    #[error("{0} is out of stock")]
    OutOfStock(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterOutcome {
    Victory,
    Defeat,
    Escaped,
}

/// Cumulative escape probability for one encounter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeChance {
    value: f64,
    step: f64,
}

impl Default for EscapeChance {
    fn default() -> Self {
        Self::new(ESCAPE_BASE_CHANCE, ESCAPE_CHANCE_STEP)
    }
}

impl EscapeChance {
    #[must_use]
    pub const fn new(base: f64, step: f64) -> Self {
        Self { value: base, step }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// One escape roll: succeeds iff the draw is below the current chance.
    pub fn attempt<D: Dice + ?Sized>(self, dice: &mut D) -> bool {
        let roll = dice.unit();
        debug_assert!(
            (0.0..1.0).contains(&roll),
            "escape roll {roll} outside [0, 1)"
        );
        roll < self.value
    }

    /// Raise the chance after an action that did not end the encounter.
    /// Once it reaches 1.0 every attempt succeeds, so it stops there.
    pub fn advance(&mut self) {
        if self.value < 1.0 {
            self.value = (self.value + self.step).min(1.0);
        }
    }
}

/// Apply one character action.
///
/// # Errors
///
/// Returns `ActionRejected` for item use with nothing left to use; no state
/// is changed in that case.
pub fn resolve_action<D: Dice + ?Sized>(
    character: &mut Character,
    enemy: &mut Enemy,
    inventory: &mut Inventory,
    escape: EscapeChance,
    choice: ActionChoice,
    dice: &mut D,
) -> Result<ActionResult, ActionRejected> {
    match choice {
        ActionChoice::Attack => Ok(ActionResult::Attacked {
            damage: strike(&*character, enemy, dice),
        }),
        ActionChoice::Defend => {
            character.defending = true;
            Ok(ActionResult::Defended)
        }
        ActionChoice::UseItem(item) => {
            if !inventory.has_usable() {
                return Err(ActionRejected::EmptyInventory);
            }
            if !inventory.take(item) {
                return Err(ActionRejected::OutOfStock(item));
            }
            let def = item.def();
            // There is only ever one enemy, so single and all-enemy targets coincide.
            let effect = match def.kind {
                ItemKind::Heal => ItemEffect::Healed {
                    target: character.name.clone(),
                    amount: character.heal(def.power),
                },
                ItemKind::Attack => ItemEffect::Damaged {
                    target: enemy.name.clone(),
                    amount: enemy.take_damage(def.power),
                },
            };
            Ok(ActionResult::ItemUsed { item, effect })
        }
        ActionChoice::Escape => Ok(ActionResult::Escape {
            success: escape.attempt(dice),
        }),
    }
}

pub type TurnOrder = SmallVec<[usize; 4]>;

/// Indices of living members, fastest first. Ties keep party order.
#[must_use]
pub fn turn_order(party: &[Character]) -> TurnOrder {
    let mut order: TurnOrder = party
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .map(|(idx, _)| idx)
        .collect();
    order.sort_by(|&a, &b| party[b].stats.agi.cmp(&party[a].stats.agi));
    order
}

/// Summary handed back to the run controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterReport {
    pub outcome: EncounterOutcome,
    pub enemy: Enemy,
    pub rounds: u32,
    /// Experience granted to each survivor (zero unless victorious).
    pub exp_awarded: u32,
}

/// One active fight. Owns the enemy; borrows the party and inventory.
pub struct Encounter<'a> {
    party: &'a mut [Character],
    inventory: &'a mut Inventory,
    enemy: Enemy,
    escape: EscapeChance,
    round: u32,
}

impl<'a> Encounter<'a> {
    pub fn new(
        party: &'a mut [Character],
        inventory: &'a mut Inventory,
        enemy: Enemy,
        escape: EscapeChance,
    ) -> Self {
        for member in party.iter_mut() {
            member.defending = false;
        }
        Self {
            party,
            inventory,
            enemy,
            escape,
            round: 0,
        }
    }

    #[must_use]
    pub const fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    #[must_use]
    pub const fn escape_chance(&self) -> f64 {
        self.escape.value()
    }

    /// Rounds started so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Fight to the end.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver stops answering mid-fight.
    pub fn run<F, D>(mut self, frontend: &mut F, dice: &mut D) -> Result<EncounterReport, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        frontend.notify(&GameEvent::EncounterBegan {
            enemy: self.enemy.name.clone(),
            boss: self.enemy.kind.is_boss(),
        });
        let outcome = loop {
            if let Some(outcome) = self.play_round(frontend, dice)? {
                break outcome;
            }
        };
        Ok(self.conclude(outcome, frontend))
    }

    /// Play a single round. Returns the outcome once the encounter is over.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver stops answering mid-round.
    pub fn play_round<F, D>(
        &mut self,
        frontend: &mut F,
        dice: &mut D,
    ) -> Result<Option<EncounterOutcome>, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        if !self.enemy.is_alive() {
            return Ok(Some(EncounterOutcome::Victory));
        }
        let order = turn_order(self.party);
        let Some(fastest) = order.iter().map(|&idx| self.party[idx].stats.agi).max() else {
            return Ok(Some(EncounterOutcome::Defeat));
        };
        self.round += 1;
        log::debug!(
            "round {} vs {} | order {:?} | escape {:.2}",
            self.round,
            self.enemy.name,
            order,
            self.escape.value()
        );

        if self.enemy.stats.agi >= fastest {
            self.enemy_strike(frontend, dice);
        }

        for idx in order {
            if !self.enemy.is_alive() {
                break;
            }
            if !self.party[idx].is_alive() {
                continue;
            }
            let result = self.player_turn(idx, frontend, dice)?;
            if matches!(result, ActionResult::Escape { success: true }) {
                return Ok(Some(EncounterOutcome::Escaped));
            }
            self.escape.advance();
        }

        if !self.enemy.is_alive() {
            return Ok(Some(EncounterOutcome::Victory));
        }
        if any_alive(self.party) {
            self.enemy_strike(frontend, dice);
        }
        if any_alive(self.party) {
            Ok(None)
        } else {
            Ok(Some(EncounterOutcome::Defeat))
        }
    }

    fn player_turn<F, D>(
        &mut self,
        idx: usize,
        frontend: &mut F,
        dice: &mut D,
    ) -> Result<ActionResult, FrontendClosed>
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        self.party[idx].defending = false;
        loop {
            let choice = {
                let view = BattleView {
                    character: &self.party[idx],
                    enemy: &self.enemy,
                    escape_chance: self.escape.value(),
                    inventory: &*self.inventory,
                    party: &*self.party,
                };
                frontend.request_character_action(&view)?
            };
            let character = &mut self.party[idx];
            match resolve_action(
                character,
                &mut self.enemy,
                &mut *self.inventory,
                self.escape,
                choice,
                dice,
            ) {
                Ok(result) => {
                    let actor = self.party[idx].name.clone();
                    frontend.notify(&self.describe(actor, &result));
                    return Ok(result);
                }
                Err(rejected) => {
                    log::debug!("{} rejected: {rejected}", self.party[idx].name);
                    frontend.notify(&GameEvent::ActionRejected {
                        actor: self.party[idx].name.clone(),
                        reason: rejected.to_string(),
                    });
                }
            }
        }
    }

    fn describe(&self, actor: String, result: &ActionResult) -> GameEvent {
        match result {
            ActionResult::Attacked { damage } => GameEvent::CharacterAttacked {
                actor,
                enemy: self.enemy.name.clone(),
                damage: *damage,
            },
            ActionResult::Defended => GameEvent::Defended { actor },
            ActionResult::ItemUsed { item, effect } => GameEvent::ItemUsed {
                actor,
                item: *item,
                effect: effect.clone(),
            },
            ActionResult::Escape { success } => GameEvent::EscapeAttempted {
                actor,
                success: *success,
            },
        }
    }

    fn enemy_strike<F, D>(&mut self, frontend: &mut F, dice: &mut D)
    where
        F: Frontend + ?Sized,
        D: Dice + ?Sized,
    {
        let living: TurnOrder = self
            .party
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(idx, _)| idx)
            .collect();
        if living.is_empty() {
            return;
        }
        let target = living[dice.pick(living.len())];
        let character = &mut self.party[target];
        let damage = strike(&self.enemy, character, dice);
        frontend.notify(&GameEvent::EnemyAttacked {
            enemy: self.enemy.name.clone(),
            target: character.name.clone(),
            damage,
        });
        if !character.is_alive() {
            frontend.notify(&GameEvent::CharacterFell {
                name: character.name.clone(),
            });
        }
    }

    fn conclude<F>(self, outcome: EncounterOutcome, frontend: &mut F) -> EncounterReport
    where
        F: Frontend + ?Sized,
    {
        let mut exp_awarded = 0;
        match outcome {
            EncounterOutcome::Victory => {
                frontend.notify(&GameEvent::EnemyDefeated {
                    enemy: self.enemy.name.clone(),
                });
                exp_awarded = self.enemy.exp;
                for member in self.party.iter_mut().filter(|c| c.is_alive()) {
                    frontend.notify(&GameEvent::ExperienceGained {
                        name: member.name.clone(),
                        amount: exp_awarded,
                    });
                    for up in member.gain_exp(exp_awarded) {
                        frontend.notify(&GameEvent::LevelUp {
                            name: up.name,
                            level: up.level,
                        });
                    }
                }
            }
            EncounterOutcome::Defeat => frontend.notify(&GameEvent::PartyWiped),
            EncounterOutcome::Escaped => {}
        }
        for member in self.party.iter_mut() {
            member.defending = false;
        }
        log::debug!(
            "encounter vs {} ended {:?} after {} rounds",
            self.enemy.name,
            outcome,
            self.round
        );
        EncounterReport {
            outcome,
            enemy: self.enemy,
            rounds: self.round,
            exp_awarded,
        }
    }
}
