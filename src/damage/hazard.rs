//! Damage from flying through hazardous terrain on Threat

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::Result;
use crate::damage::hit::{apply_hit, Hit, HitReport};
use crate::dice::{challenge_total, ChallengeDie, DiceSource};
use crate::ship::Starship;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardReport {
    pub dice: Vec<ChallengeDie>,
    pub total: u32,
    /// None when the dice came up blank
    pub hit: Option<HitReport>,
}

/// Roll `dice_count` challenge dice and run their total through the hit pipeline
pub fn resolve_hazard(
    ship: &mut Starship,
    dice_count: u32,
    dice: &mut impl DiceSource,
) -> Result<HazardReport> {
    let rolled = dice.roll_challenge(dice_count as usize);
    let total = challenge_total(&rolled).total;
    let hit = if total > 0 {
        Some(apply_hit(ship, &Hit::new(total), dice)?)
    } else {
        None
    };
    info!(ship = %ship.name, total, "Hazard damage");
    Ok(HazardReport {
        dice: rolled,
        total,
        hit,
    })
}
