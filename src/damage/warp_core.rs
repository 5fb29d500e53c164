//! End-of-round warp core breach check

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::types::EntityId;
use crate::damage::hit::Hit;
use crate::dice::DiceSource;
use crate::ship::Starship;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpCoreCheck {
    pub ship: EntityId,
    /// None when a stabilized reactor skipped the roll
    pub roll: Option<u8>,
    pub stabilized: bool,
    pub exploded: bool,
}

/// Roll for a ship whose warp core is at risk. Rolling over the ship's
/// Engineering department detonates it. A stabilized reactor skips one check.
pub fn check_warp_core(ship: &mut Starship, dice: &mut impl DiceSource) -> Option<WarpCoreCheck> {
    if !ship.warp_core_at_risk() {
        return None;
    }

    if ship.reactor_stabilized {
        ship.reactor_stabilized = false;
        info!(ship = %ship.name, "Warp core held by stabilized reactor");
        return Some(WarpCoreCheck {
            ship: ship.id,
            roll: None,
            stabilized: true,
            exploded: false,
        });
    }

    let roll = dice.d20();
    let exploded = roll > ship.departments.engineering;
    if exploded {
        ship.destroyed = true;
        warn!(ship = %ship.name, roll, "Warp core breach");
    } else {
        info!(ship = %ship.name, roll, "Warp core holds");
    }

    Some(WarpCoreCheck {
        ship: ship.id,
        roll: Some(roll),
        stabilized: false,
        exploded,
    })
}

/// The blast a detonating ship deals to every ship in its zone
pub fn explosion_hit(scale: u8) -> Hit {
    Hit::new(scale as u32 + 1).piercing()
}
