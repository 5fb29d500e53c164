//! Dice sources
//!
//! Everything random in combat goes through `DiceSource`, so a fixed seed or
//! a scripted sequence reproduces an encounter exactly.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::dice::challenge::ChallengeDie;

/// A source of d20 and d6 results
pub trait DiceSource {
    /// One d20, uniform in [1, 20]
    fn d20(&mut self) -> u8;

    /// One d6, uniform in [1, 6]
    fn d6(&mut self) -> u8;

    /// `count` independent d20s
    fn roll(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.d20()).collect()
    }

    /// `count` challenge dice
    fn roll_challenge(&mut self, count: usize) -> Vec<ChallengeDie> {
        (0..count).map(|_| ChallengeDie::from_face(self.d6())).collect()
    }
}

/// Dice backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DiceSource for RngDice<R> {
    fn d20(&mut self) -> u8 {
        self.rng.gen_range(1..=20)
    }

    fn d6(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Deterministic dice for a given seed
pub type SeededDice = RngDice<ChaCha8Rng>;

impl SeededDice {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Replays fixed die faces, in order
///
/// Once a queue runs dry the source keeps returning its fallback face
/// (10 for d20s, 3 for d6s) so a short script never panics mid-resolution.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    d20s: VecDeque<u8>,
    d6s: VecDeque<u8>,
}

impl ScriptedDice {
    pub const D20_FALLBACK: u8 = 10;
    pub const D6_FALLBACK: u8 = 3;

    pub fn new(d20s: impl IntoIterator<Item = u8>) -> Self {
        Self {
            d20s: d20s.into_iter().map(|d| d.clamp(1, 20)).collect(),
            d6s: VecDeque::new(),
        }
    }

    pub fn with_d6(mut self, d6s: impl IntoIterator<Item = u8>) -> Self {
        self.d6s.extend(d6s.into_iter().map(|d| d.clamp(1, 6)));
        self
    }

    pub fn push_d20(&mut self, face: u8) {
        self.d20s.push_back(face.clamp(1, 20));
    }

    /// d20 faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.d20s.len()
    }
}

impl DiceSource for ScriptedDice {
    fn d20(&mut self) -> u8 {
        self.d20s.pop_front().unwrap_or(Self::D20_FALLBACK)
    }

    fn d6(&mut self) -> u8 {
        self.d6s.pop_front().unwrap_or(Self::D6_FALLBACK)
    }
}
