use std::fmt;

use clap::ValueEnum;
use delve_game::{
    ActionChoice, BattleView, Combatant, Frontend, FrontendClosed, GameEvent, ItemId, ItemKind,
    Job,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PlayPolicy {
    /// Always attack
    Aggressive,
    /// Heal below 40% HP when a heal item is usable, attack otherwise
    Cautious,
    /// Always try to run
    Coward,
    /// Uniform choice between every currently legal action
    Random,
}

/// HP share under which the cautious policy heals.
const CAUTIOUS_HEAL_PERCENT: u32 = 40;

impl PlayPolicy {
    pub const ALL: [Self; 4] = [Self::Aggressive, Self::Cautious, Self::Coward, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Cautious => "Cautious",
            Self::Coward => "Coward",
            Self::Random => "Random",
        }
    }
}

impl fmt::Display for PlayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counters gathered while an [`AutoPlayer`] drives a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTally {
    pub encounters: u32,
    pub escapes: u32,
    pub items_used: u32,
    pub level_ups: u32,
    pub rejected: u32,
}

/// Front end that answers every prompt from a [`PlayPolicy`].
pub struct AutoPlayer {
    policy: PlayPolicy,
    rng: ChaCha20Rng,
    tally: RunTally,
}

impl AutoPlayer {
    #[must_use]
    pub fn new(policy: PlayPolicy, seed: u64) -> Self {
        Self {
            policy,
            rng: ChaCha20Rng::seed_from_u64(seed),
            tally: RunTally::default(),
        }
    }

    #[must_use]
    pub const fn tally(&self) -> RunTally {
        self.tally
    }

    /// Four-member roster covering the front, healer, and caster roles.
    #[must_use]
    pub fn default_roster() -> Vec<(String, Job)> {
        [Job::Warrior, Job::Priest, Job::Mage, Job::Thief]
            .into_iter()
            .enumerate()
            .map(|(idx, job)| (format!("Bot{}", idx + 1), job))
            .collect()
    }

    fn cautious(view: &BattleView<'_>) -> ActionChoice {
        let character = view.character;
        let low = character.hp() * 100 < character.max_hp() * CAUTIOUS_HEAL_PERCENT;
        if low && let Some(item) = first_heal(view) {
            return ActionChoice::UseItem(item);
        }
        ActionChoice::Attack
    }

    fn random(&mut self, view: &BattleView<'_>) -> ActionChoice {
        let mut options = vec![ActionChoice::Attack, ActionChoice::Defend, ActionChoice::Escape];
        options.extend(
            view.inventory
                .usable()
                .into_iter()
                .map(|(item, _)| ActionChoice::UseItem(item)),
        );
        options[self.rng.gen_range(0..options.len())]
    }
}

fn first_heal(view: &BattleView<'_>) -> Option<ItemId> {
    view.inventory
        .usable()
        .into_iter()
        .map(|(item, _)| item)
        .find(|item| item.def().kind == ItemKind::Heal)
}

impl Frontend for AutoPlayer {
    fn request_party_creation(&mut self, _size: usize) -> Result<Vec<(String, Job)>, FrontendClosed> {
        Ok(Self::default_roster())
    }

    fn request_character_action(
        &mut self,
        view: &BattleView<'_>,
    ) -> Result<ActionChoice, FrontendClosed> {
        Ok(match self.policy {
            PlayPolicy::Aggressive => ActionChoice::Attack,
            PlayPolicy::Cautious => Self::cautious(view),
            PlayPolicy::Coward => ActionChoice::Escape,
            PlayPolicy::Random => self.random(view),
        })
    }

    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EncounterBegan { .. } => self.tally.encounters += 1,
            GameEvent::EscapeAttempted { success: true, .. } => self.tally.escapes += 1,
            GameEvent::ItemUsed { .. } => self.tally.items_used += 1,
            GameEvent::LevelUp { .. } => self.tally.level_ups += 1,
            GameEvent::ActionRejected { .. } => self.tally.rejected += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_game::{Character, EnemyKind, Inventory};

    fn ask(player: &mut AutoPlayer, character: &Character, inventory: &Inventory) -> ActionChoice {
        let enemy = EnemyKind::Goblin.spawn();
        let party = [character.clone()];
        let view = BattleView {
            character,
            enemy: &enemy,
            escape_chance: 0.25,
            inventory,
            party: &party,
        };
        player.request_character_action(&view).unwrap()
    }

    #[test]
    fn cautious_heals_only_when_low_and_stocked() {
        let mut player = AutoPlayer::new(PlayPolicy::Cautious, 1);
        let mut hero = Character::new("Bot1", Job::Warrior);
        let stocked = Inventory::starting();
        assert_eq!(ask(&mut player, &hero, &stocked), ActionChoice::Attack);

        hero.hp = 11;
        assert_eq!(
            ask(&mut player, &hero, &stocked),
            ActionChoice::UseItem(ItemId::Potion)
        );
        let mut only_bombs = Inventory::empty();
        only_bombs.add(ItemId::BlastStone, 1);
        assert_eq!(ask(&mut player, &hero, &only_bombs), ActionChoice::Attack);

        // exactly 40% is not below the line
        hero.hp = 12;
        assert_eq!(ask(&mut player, &hero, &stocked), ActionChoice::Attack);
    }

    #[test]
    fn random_policy_is_seed_stable_and_legal() {
        let hero = Character::new("Bot1", Job::Mage);
        let inventory = Inventory::empty();
        let picks = |seed| {
            let mut player = AutoPlayer::new(PlayPolicy::Random, seed);
            (0..16)
                .map(|_| ask(&mut player, &hero, &inventory))
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(5), picks(5));
        assert!(
            picks(5)
                .iter()
                .all(|choice| !matches!(choice, ActionChoice::UseItem(_)))
        );
    }

    #[test]
    fn tally_counts_notable_events() {
        let mut player = AutoPlayer::new(PlayPolicy::Coward, 0);
        player.notify(&GameEvent::EncounterBegan {
            enemy: "スライム".into(),
            boss: false,
        });
        player.notify(&GameEvent::EscapeAttempted {
            actor: "Bot1".into(),
            success: false,
        });
        player.notify(&GameEvent::EscapeAttempted {
            actor: "Bot2".into(),
            success: true,
        });
        assert_eq!(
            player.tally(),
            RunTally {
                encounters: 1,
                escapes: 1,
                ..RunTally::default()
            }
        );
    }
}
