//! Party members.
use crate::combatant::Combatant;
use crate::progression::{LevelUps, level_up_if_ready};
use crate::stats::{Job, Stats};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A player-controlled adventurer.
///
/// The serialized shape is the persisted party entry; the transient
/// `defending` flag is never saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub job: Job,
    pub level: u32,
    pub exp: u32,
    pub stats: Stats,
    pub hp: u32,
    pub mp: u32,
    #[serde(skip)]
    pub defending: bool,
}

impl Character {
    /// Fresh level-1 character with its own copy of the job template.
    #[must_use]
    pub fn new(name: impl Into<String>, job: Job) -> Self {
        let stats = job.base_stats();
        Self {
            name: name.into(),
            job,
            level: 1,
            exp: 0,
            stats,
            hp: stats.hp,
            mp: stats.mp,
            defending: false,
        }
    }

    /// Add experience and apply every level-up it unlocks.
    pub fn gain_exp(&mut self, amount: u32) -> LevelUps {
        self.exp = self.exp.saturating_add(amount);
        level_up_if_ready(self)
    }

    /// Refill hit and magic points.
    pub fn restore(&mut self) {
        self.hp = self.stats.hp;
        self.mp = self.stats.mp;
    }

    #[must_use]
    pub const fn max_mp(&self) -> u32 {
        self.stats.mp
    }
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn hp(&self) -> u32 {
        self.hp
    }

    fn hp_mut(&mut self) -> &mut u32 {
        &mut self.hp
    }

    fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    fn attack_power(&self) -> u32 {
        self.stats.atk
    }

    fn defense(&self) -> u32 {
        self.stats.def
    }

    fn agility(&self) -> u32 {
        self.stats.agi
    }

    fn is_defending(&self) -> bool {
        self.defending
    }
}

/// Reasons a requested party roster is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartyError {
    #[error("party needs exactly {expected} members (got {actual})")]
    WrongSize { expected: usize, actual: usize },
    #[error("member {index} has an empty name")]
    EmptyName { index: usize },
}

/// Build a party from `(name, job)` pairs. Names are trimmed.
///
/// # Errors
///
/// Returns `PartyError` when the roster length differs from `size` or any
/// name is blank.
pub fn build_party(roster: Vec<(String, Job)>, size: usize) -> Result<Vec<Character>, PartyError> {
    if roster.len() != size {
        return Err(PartyError::WrongSize {
            expected: size,
            actual: roster.len(),
        });
    }
    roster
        .into_iter()
        .enumerate()
        .map(|(index, (name, job))| {
            let name = name.trim();
            if name.is_empty() {
                Err(PartyError::EmptyName { index: index + 1 })
            } else {
                Ok(Character::new(name, job))
            }
        })
        .collect()
}

/// Whether any member can still act.
#[must_use]
pub fn any_alive(party: &[Character]) -> bool {
    party.iter().any(Combatant::is_alive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_character_starts_full() {
        let c = Character::new("アレン", Job::Warrior);
        assert_eq!(c.level, 1);
        assert_eq!(c.exp, 0);
        assert_eq!(c.hp, 30);
        assert_eq!(c.mp, 5);
        assert!(!c.defending);
        assert!(c.is_alive());
    }

    #[test]
    fn take_damage_clamps_at_zero() {
        let mut c = Character::new("ミナ", Job::Mage);
        assert_eq!(c.take_damage(5), 5);
        assert_eq!(c.hp, 13);
        assert_eq!(c.take_damage(100), 13);
        assert_eq!(c.hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut c = Character::new("ロイ", Job::Thief);
        c.hp = 10;
        assert_eq!(c.heal(20), 12);
        assert_eq!(c.hp, 22);
    }

    #[test]
    fn build_party_validates_roster() {
        let roster = vec![
            ("A".to_string(), Job::Warrior),
            ("B".to_string(), Job::Priest),
        ];
        assert_eq!(
            build_party(roster, 4),
            Err(PartyError::WrongSize {
                expected: 4,
                actual: 2
            })
        );

        let roster = vec![
            ("A".to_string(), Job::Warrior),
            ("  ".to_string(), Job::Priest),
        ];
        assert_eq!(build_party(roster, 2), Err(PartyError::EmptyName { index: 2 }));

        let roster = vec![(" A ".to_string(), Job::Warrior)];
        let party = build_party(roster, 1).unwrap();
        assert_eq!(party[0].name, "A");
    }

    #[test]
    fn defending_flag_is_not_persisted() {
        let mut c = Character::new("セラ", Job::Priest);
        c.defending = true;
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("defending").is_none());
        let back: Character = serde_json::from_value(json).unwrap();
        assert!(!back.defending);
        assert_eq!(back.stats, c.stats);
    }
}
