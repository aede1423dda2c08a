//! Attribute blocks and job archetypes.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Full attribute set carried by a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "HP")]
    pub hp: u32,
    #[serde(rename = "MP")]
    pub mp: u32,
    #[serde(rename = "ATK")]
    pub atk: u32,
    #[serde(rename = "DEF")]
    pub def: u32,
    #[serde(rename = "MAT")]
    pub mat: u32,
    #[serde(rename = "MDE")]
    pub mde: u32,
    #[serde(rename = "AGI")]
    pub agi: u32,
    #[serde(rename = "LUK")]
    pub luk: u32,
}

impl Stats {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        hp: u32,
        mp: u32,
        atk: u32,
        def: u32,
        mat: u32,
        mde: u32,
        agi: u32,
        luk: u32,
    ) -> Self {
        Self {
            hp,
            mp,
            atk,
            def,
            mat,
            mde,
            agi,
            luk,
        }
    }

    /// Add the same amount to every attribute.
    pub fn grow(&mut self, amount: u32) {
        for stat in [
            &mut self.hp,
            &mut self.mp,
            &mut self.atk,
            &mut self.def,
            &mut self.mat,
            &mut self.mde,
            &mut self.agi,
            &mut self.luk,
        ] {
            *stat = stat.saturating_add(amount);
        }
    }
}

/// Reduced attribute set carried by an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    #[serde(rename = "HP")]
    pub hp: u32,
    #[serde(rename = "ATK")]
    pub atk: u32,
    #[serde(rename = "DEF")]
    pub def: u32,
    #[serde(rename = "AGI")]
    pub agi: u32,
}

/// Character archetypes. Each one maps to a fixed base template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Job {
    #[serde(rename = "戦士")]
    Warrior,
    #[serde(rename = "神官")]
    Priest,
    #[serde(rename = "魔法使い")]
    Mage,
    #[serde(rename = "盗賊")]
    Thief,
    #[serde(rename = "魔法戦士")]
    Spellblade,
    #[serde(rename = "どうぐ使い")]
    Artificer,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job: {0}")]
pub struct UnknownJob(pub String);

impl Job {
    /// Every job in menu order.
    pub const ALL: [Self; 6] = [
        Self::Warrior,
        Self::Priest,
        Self::Mage,
        Self::Thief,
        Self::Spellblade,
        Self::Artificer,
    ];

    /// Display name, also used as the persisted key.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warrior => "戦士",
            Self::Priest => "神官",
            Self::Mage => "魔法使い",
            Self::Thief => "盗賊",
            Self::Spellblade => "魔法戦士",
            Self::Artificer => "どうぐ使い",
        }
    }

    #[must_use]
    pub const fn ident(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Priest => "priest",
            Self::Mage => "mage",
            Self::Thief => "thief",
            Self::Spellblade => "spellblade",
            Self::Artificer => "artificer",
        }
    }

    /// Base template. Every call hands out a fresh copy.
    #[must_use]
    pub const fn base_stats(self) -> Stats {
        match self {
            Self::Warrior => Stats::new(30, 5, 8, 8, 2, 3, 5, 5),
            Self::Priest => Stats::new(20, 15, 4, 4, 6, 6, 4, 5),
            Self::Mage => Stats::new(18, 20, 3, 3, 8, 5, 5, 5),
            Self::Thief => Stats::new(22, 8, 5, 4, 3, 3, 8, 7),
            Self::Spellblade => Stats::new(25, 10, 6, 6, 4, 4, 6, 5),
            Self::Artificer => Stats::new(20, 10, 4, 4, 2, 4, 6, 8),
        }
    }

    /// Resolve a 1-based menu selection.
    ///
    /// # Errors
    ///
    /// Returns `UnknownJob` when the index is outside the menu.
    pub fn from_menu_index(index: usize) -> Result<Self, UnknownJob> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| UnknownJob(index.to_string()))
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Job {
    type Err = UnknownJob;

    /// Accepts the display name, the ASCII identifier, or a 1-based menu index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if let Ok(index) = token.parse::<usize>() {
            return Self::from_menu_index(index);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|job| job.label() == token || job.ident().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownJob(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warrior_template_matches_table() {
        let stats = Job::Warrior.base_stats();
        assert_eq!(stats, Stats::new(30, 5, 8, 8, 2, 3, 5, 5));
    }

    #[test]
    fn templates_are_independent_copies() {
        let mut a = Job::Mage.base_stats();
        a.grow(2);
        assert_eq!(Job::Mage.base_stats().hp, 18);
        assert_eq!(a.hp, 20);
        assert_eq!(a.luk, 7);
    }

    #[test]
    fn parses_labels_idents_and_indices() {
        assert_eq!("盗賊".parse::<Job>(), Ok(Job::Thief));
        assert_eq!("Spellblade".parse::<Job>(), Ok(Job::Spellblade));
        assert_eq!(" 1 ".parse::<Job>(), Ok(Job::Warrior));
        assert_eq!("6".parse::<Job>(), Ok(Job::Artificer));
    }

    #[test]
    fn rejects_unknown_jobs() {
        assert!("0".parse::<Job>().is_err());
        assert!("7".parse::<Job>().is_err());
        assert_eq!("勇者".parse::<Job>(), Err(UnknownJob("勇者".into())));
    }

    #[test]
    fn stats_serialize_with_attribute_keys() {
        let json = serde_json::to_value(Job::Priest.base_stats()).unwrap();
        assert_eq!(json["HP"], 20);
        assert_eq!(json["MDE"], 6);
        assert_eq!(serde_json::to_value(Job::Priest).unwrap(), "神官");
    }
}
