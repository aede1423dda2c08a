//! Physical damage formula shared by both sides of a fight.
use crate::constants::{MIN_BASE_DAMAGE, VARIATION_MAX, VARIATION_MIN};
use crate::numbers::{floor_f64_to_u32, u32_to_f64};

/// Pre-variation damage: half the attack minus a quarter of the defense,
/// never below one.
#[must_use]
pub fn base_damage(attack: u32, defense: u32) -> f64 {
    let base = u32_to_f64(attack) / 2.0 - u32_to_f64(defense) / 4.0;
    base.max(MIN_BASE_DAMAGE)
}

/// Final damage for one hit given an already drawn variation multiplier.
///
/// A defending target takes half, rounded down.
#[must_use]
pub fn compute_damage(attack: u32, defense: u32, defending: bool, variation: f64) -> u32 {
    debug_assert!(
        (VARIATION_MIN..=VARIATION_MAX).contains(&variation),
        "damage variation {variation} outside [{VARIATION_MIN}, {VARIATION_MAX}]"
    );
    let raw = floor_f64_to_u32(base_damage(attack, defense) * variation);
    if defending { raw / 2 } else { raw }
}
