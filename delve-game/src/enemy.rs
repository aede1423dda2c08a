//! Monsters and the fixed roster they are drawn from.
use crate::combatant::Combatant;
use crate::stats::EnemyStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Goblin,
    Wolf,
    DungeonBoss,
}

impl EnemyKind {
    /// Regular encounters, drawn uniformly.
    pub const ROSTER: [Self; 3] = [Self::Slime, Self::Goblin, Self::Wolf];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slime => "スライム",
            Self::Goblin => "ゴブリン",
            Self::Wolf => "オオカミ",
            Self::DungeonBoss => "ダンジョンボス",
        }
    }

    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        let (hp, atk, def, agi) = match self {
            Self::Slime => (15, 5, 2, 3),
            Self::Goblin => (20, 6, 3, 4),
            Self::Wolf => (25, 7, 4, 6),
            Self::DungeonBoss => (50, 10, 6, 5),
        };
        EnemyStats { hp, atk, def, agi }
    }

    /// Experience granted to each surviving character on victory.
    #[must_use]
    pub const fn exp_reward(self) -> u32 {
        match self {
            Self::Slime => 5,
            Self::Goblin => 8,
            Self::Wolf => 10,
            Self::DungeonBoss => 50,
        }
    }

    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::DungeonBoss)
    }

    /// Create a fresh instance at full health.
    #[must_use]
    pub fn spawn(self) -> Enemy {
        Enemy::new(self)
    }
}

/// A single opponent, alive for one encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub name: String,
    pub stats: EnemyStats,
    pub hp: u32,
    pub exp: u32,
}

impl Enemy {
    #[must_use]
    pub fn new(kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            name: kind.name().to_string(),
            stats,
            hp: stats.hp,
            exp: kind.exp_reward(),
        }
    }

    /// Custom opponent outside the roster, mainly for tuning and tests.
    #[must_use]
    pub fn custom(name: impl Into<String>, kind: EnemyKind, stats: EnemyStats, exp: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            stats,
            hp: stats.hp,
            exp,
        }
    }
}

impl Combatant for Enemy {
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
}
