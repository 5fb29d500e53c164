//! Dice engine: d20 task dice and d6 challenge dice

pub mod challenge;
pub mod source;

pub use challenge::{challenge_total, ChallengeDie, ChallengeTotal};
pub use source::{DiceSource, RngDice, ScriptedDice, SeededDice};
