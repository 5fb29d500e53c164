//! Challenge dice (d6 with damage faces)

use serde::{Deserialize, Serialize};

/// One rolled challenge die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDie {
    pub face: u8,
    pub value: u8,
    pub effect: bool,
}

impl ChallengeDie {
    /// Faces 1-4 score nothing; 5 and 6 score 1 and carry an Effect
    pub fn from_face(face: u8) -> Self {
        match face {
            5 | 6 => Self {
                face,
                value: 1,
                effect: true,
            },
            _ => Self {
                face,
                value: 0,
                effect: false,
            },
        }
    }
}

/// Summed outcome of a pool of challenge dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChallengeTotal {
    pub total: u32,
    pub effects: u32,
}

pub fn challenge_total(dice: &[ChallengeDie]) -> ChallengeTotal {
    dice.iter().fold(ChallengeTotal::default(), |mut acc, d| {
        acc.total += d.value as u32;
        if d.effect {
            acc.effects += 1;
        }
        acc
    })
}
