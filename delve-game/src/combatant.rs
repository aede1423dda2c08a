//! Capabilities shared by everything that can fight.
use crate::damage::compute_damage;
use crate::dice::Dice;

pub trait Combatant {
    fn name(&self) -> &str;

    /// Current hit points.
    fn hp(&self) -> u32;

    /// Mutable access to current hit points for the clamped primitives below.
    fn hp_mut(&mut self) -> &mut u32;

    fn max_hp(&self) -> u32;
    fn attack_power(&self) -> u32;
    fn defense(&self) -> u32;
    fn agility(&self) -> u32;

    /// Whether incoming hits are halved this round.
    fn is_defending(&self) -> bool {
        false
    }

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }

    /// Subtract hit points, stopping at zero. Returns the amount actually lost.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let hp = self.hp_mut();
        let lost = amount.min(*hp);
        *hp -= lost;
        lost
    }

    /// Restore hit points up to the maximum. Returns the amount actually gained.
    fn heal(&mut self, amount: u32) -> u32 {
        let max = self.max_hp();
        let hp = self.hp_mut();
        let before = *hp;
        *hp = before.saturating_add(amount).min(max);
        *hp - before
    }
}

/// One physical hit from `attacker` into `defender`, using one variation draw.
///
/// Returns the damage the formula produced, which may exceed what the
/// defender had left.
pub fn strike<A, T, D>(attacker: &A, defender: &mut T, dice: &mut D) -> u32
where
    A: Combatant + ?Sized,
    T: Combatant + ?Sized,
    D: Dice + ?Sized,
{
    let variation = dice.variation();
    let damage = compute_damage(
        attacker.attack_power(),
        defender.defense(),
        defender.is_defending(),
        variation,
    );
    defender.take_damage(damage);
    log::trace!(
        "{} hits {} for {damage} (variation {variation:.3}, hp left {})",
        attacker.name(),
        defender.name(),
        defender.hp()
    );
    damage
}
