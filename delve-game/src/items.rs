//! Item catalog and the shared party inventory.
use crate::constants::STARTING_ITEM_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Heal,
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTarget {
    Ally,
    Enemy,
    AllEnemies,
}

/// Static effect definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    pub kind: ItemKind,
    pub power: u32,
    pub target: ItemTarget,
}

/// Closed item catalog. Declaration order is listing order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ItemId {
    #[serde(rename = "回復薬-1")]
    Potion,
    #[serde(rename = "回復薬-2")]
    HiPotion,
    #[serde(rename = "火炎草")]
    FireHerb,
    #[serde(rename = "ばくだん石")]
    BlastStone,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown item: {0}")]
pub struct UnknownItem(pub String);

impl ItemId {
    pub const ALL: [Self; 4] = [Self::Potion, Self::HiPotion, Self::FireHerb, Self::BlastStone];

    /// Item handed out by treasure chests.
    pub const TREASURE: Self = Self::Potion;

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Potion => "回復薬-1",
            Self::HiPotion => "回復薬-2",
            Self::FireHerb => "火炎草",
            Self::BlastStone => "ばくだん石",
        }
    }

    #[must_use]
    pub const fn def(self) -> ItemDef {
        match self {
            Self::Potion => ItemDef {
                kind: ItemKind::Heal,
                power: 20,
                target: ItemTarget::Ally,
            },
            Self::HiPotion => ItemDef {
                kind: ItemKind::Heal,
                power: 40,
                target: ItemTarget::Ally,
            },
            Self::FireHerb => ItemDef {
                kind: ItemKind::Attack,
                power: 20,
                target: ItemTarget::Enemy,
            },
            Self::BlastStone => ItemDef {
                kind: ItemKind::Attack,
                power: 20,
                target: ItemTarget::AllEnemies,
            },
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemId {
    type Err = UnknownItem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.name() == token)
            .ok_or_else(|| UnknownItem(token.to_string()))
    }
}

/// Item counts shared by the whole party. Counts never go negative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: BTreeMap<ItemId, u32>,
}

impl Inventory {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `count` of every catalog item.
    #[must_use]
    pub fn stocked(count: u32) -> Self {
        Self {
            counts: ItemId::ALL.iter().map(|&item| (item, count)).collect(),
        }
    }

    /// Inventory a new run begins with.
    #[must_use]
    pub fn starting() -> Self {
        Self::stocked(STARTING_ITEM_COUNT)
    }

    #[must_use]
    pub fn count(&self, item: ItemId) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    pub fn add(&mut self, item: ItemId, amount: u32) {
        let entry = self.counts.entry(item).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove one unit. Returns `false` (and changes nothing) when out of stock.
    pub fn take(&mut self, item: ItemId) -> bool {
        match self.counts.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Items with at least one unit, in catalog order.
    #[must_use]
    pub fn usable(&self) -> Vec<(ItemId, u32)> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&item, &count)| (item, count))
            .collect()
    }

    #[must_use]
    pub fn has_usable(&self) -> bool {
        self.counts.values().any(|&count| count > 0)
    }
}
