//! Random sources for the battle engine.
//!
//! Every random decision in a run goes through [`Dice`]. Production runs use
//! [`SeededDice`], a counted `ChaCha20` stream derived from a user seed; tests
//! and replays use [`ScriptedDice`], which hands back a fixed script.
use crate::constants::{VARIATION_MAX, VARIATION_MIN};
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::VecDeque;

/// Source of the three kinds of draws the engine needs.
pub trait Dice {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Damage multiplier in `[VARIATION_MIN, VARIATION_MAX]`.
    fn variation(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is always non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }

    fn variation(&mut self) -> f64 {
        (**self).variation()
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

type HmacSha256 = Hmac<Sha256>;

/// 32-byte seed for the stream named by `domain_tag`, keyed by `user_seed`.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    seed
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R: RngCore> CountingRng<R> {
    pub const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

/// Deterministic dice seeded from a user-visible seed.
#[derive(Debug, Clone)]
pub struct SeededDice {
    seed: u64,
    rng: CountingRng<ChaCha20Rng>,
}

impl SeededDice {
    /// Construct the stream for a run.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let bytes = derive_stream_seed(seed, b"delve-run");
        Self {
            seed,
            rng: CountingRng::new(ChaCha20Rng::from_seed(bytes)),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of raw draws taken so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }
}

impl Dice for SeededDice {
    fn unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn variation(&mut self) -> f64 {
        self.rng.gen_range(VARIATION_MIN..=VARIATION_MAX)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Dice that replay a fixed script.
///
/// Scripted values outside their documented range are rejected with a panic,
/// as is asking for a draw after the script (and any fallback) is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    units: VecDeque<f64>,
    variations: VecDeque<f64>,
    picks: VecDeque<usize>,
    fallback_unit: Option<f64>,
    fallback_variation: Option<f64>,
    fallback_pick: Option<usize>,
}

fn check_unit(value: f64) -> f64 {
    assert!(
        (0.0..1.0).contains(&value),
        "probability draw {value} outside [0, 1)"
    );
    value
}

fn check_variation(value: f64) -> f64 {
    assert!(
        (VARIATION_MIN..=VARIATION_MAX).contains(&value),
        "damage variation {value} outside [{VARIATION_MIN}, {VARIATION_MAX}]"
    );
    value
}

impl ScriptedDice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn units(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(values.into_iter().map(check_unit));
        self
    }

    #[must_use]
    pub fn variations(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.variations.extend(values.into_iter().map(check_variation));
        self
    }

    #[must_use]
    pub fn picks(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(values);
        self
    }

    /// Value returned by `unit` once the scripted units run out.
    #[must_use]
    pub fn always_unit(mut self, value: f64) -> Self {
        self.fallback_unit = Some(check_unit(value));
        self
    }

    /// Value returned by `variation` once the scripted variations run out.
    #[must_use]
    pub fn always_variation(mut self, value: f64) -> Self {
        self.fallback_variation = Some(check_variation(value));
        self
    }

    /// Index returned by `pick` once the scripted picks run out.
    #[must_use]
    pub fn always_pick(mut self, value: usize) -> Self {
        self.fallback_pick = Some(value);
        self
    }

    /// Scripted draws not yet consumed, across all three queues.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.units.len() + self.variations.len() + self.picks.len()
    }
}

impl Dice for ScriptedDice {
    fn unit(&mut self) -> f64 {
        self.units
            .pop_front()
            .or(self.fallback_unit)
            .expect("scripted dice ran out of unit draws")
    }

    fn variation(&mut self) -> f64 {
        self.variations
            .pop_front()
            .or(self.fallback_variation)
            .expect("scripted dice ran out of variation draws")
    }

    fn pick(&mut self, len: usize) -> usize {
        let index = self
            .picks
            .pop_front()
            .or(self.fallback_pick)
            .expect("scripted dice ran out of pick draws");
        assert!(index < len, "scripted pick {index} outside 0..{len}");
        index
    }
}
