//! Applying one hit to a ship: resistance, complications, shields, breach

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::dice::DiceSource;
use crate::ship::{BreachOutcome, Starship, SystemType};

/// A single hit about to land on a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hit {
    /// Damage before resistance
    pub damage: u32,
    pub piercing: bool,
    /// Complications rolled on the attack; each removes 1 damage
    pub complications: u32,
    /// Depleting weapons never leave the target Shaken
    pub depleting: bool,
    /// Extra resistance from the defender's effects
    pub resistance_bonus: i32,
    /// Attacker-chosen system; random when absent
    pub chosen_system: Option<SystemType>,
}

impl Hit {
    pub fn new(damage: u32) -> Self {
        Self {
            damage,
            ..Self::default()
        }
    }

    pub fn piercing(mut self) -> Self {
        self.piercing = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitReport {
    pub raw_damage: u32,
    pub resistance: u32,
    pub after_resistance: u32,
    /// Damage after complications
    pub damage: u32,
    pub shields_before: u32,
    pub shields_after: u32,
    pub shaken: bool,
    pub breach: Option<BreachOutcome>,
    /// d20 rolled on the system-hit table, when the system was random
    pub hit_roll: Option<u8>,
}

fn pick_system(hit: &Hit, dice: &mut impl DiceSource) -> (SystemType, Option<u8>) {
    match hit.chosen_system {
        Some(system) => (system, None),
        None => {
            let roll = dice.d20();
            (SystemType::from_hit_roll(roll), Some(roll))
        }
    }
}

/// Run one hit through resistance, complications, shields and breach
/// accounting. Shields never go below 0.
pub fn apply_hit(defender: &mut Starship, hit: &Hit, dice: &mut impl DiceSource) -> Result<HitReport> {
    if let Err(err) = defender.check_invariants() {
        warn!(ship = %defender.name, error = %err, "Rejecting hit on inconsistent ship");
        return Err(err);
    }

    let resistance = (defender.resistance as i32 + hit.resistance_bonus).max(0) as u32;
    let after_resistance = if hit.piercing {
        hit.damage
    } else {
        hit.damage.saturating_sub(resistance).max(1)
    };
    let damage = after_resistance.saturating_sub(hit.complications).max(1);

    let shields_before = defender.effective_shields();
    let mut shaken = false;
    let mut breach = None;
    let mut hit_roll = None;

    if shields_before > 0 {
        defender.shields.reduce(damage);
        let current = defender.shields.current;
        let max = defender.shields.max;

        if !hit.depleting && current * 2 < max {
            shaken = true;
            defender.shaken = true;
            info!(ship = %defender.name, shields = current, "Shaken");

            if current * 4 < max {
                let (system, roll) = pick_system(hit, dice);
                hit_roll = roll;
                breach = Some(defender.apply_breach(system));
            }
        }
    } else {
        let (system, roll) = pick_system(hit, dice);
        hit_roll = roll;
        breach = Some(defender.apply_breach(system));
    }

    let report = HitReport {
        raw_damage: hit.damage,
        resistance: if hit.piercing { 0 } else { resistance },
        after_resistance,
        damage,
        shields_before,
        shields_after: defender.effective_shields(),
        shaken,
        breach,
        hit_roll,
    };
    debug!(ship = %defender.name, ?report, "Hit applied");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::ship::{Departments, Shields, Systems};

    fn target(current: u32, max: u32, resistance: u32) -> Starship {
        let mut ship = Starship::new("Target", 4, Systems::default(), Departments::default());
        ship.shields = Shields { current, max };
        ship.resistance = resistance;
        ship
    }

    #[test]
    fn test_shaken_then_breach_in_one_hit() {
        let mut ship = target(10, 20, 2);
        let mut dice = ScriptedDice::new([12]);
        let report = apply_hit(&mut ship, &Hit::new(10), &mut dice).unwrap();
        assert_eq!(report.after_resistance, 8);
        assert_eq!(report.shields_after, 2);
        assert!(report.shaken);
        let breach = report.breach.unwrap();
        assert_eq!(breach.system, SystemType::Structure);
        assert_eq!(ship.total_breaches(), 1);
    }

    #[test]
    fn test_shaken_without_breach() {
        let mut ship = target(20, 20, 0);
        let mut dice = ScriptedDice::default();
        let report = apply_hit(&mut ship, &Hit::new(11), &mut dice).unwrap();
        assert_eq!(report.shields_after, 9);
        assert!(report.shaken);
        assert!(report.breach.is_none());
    }

    #[test]
    fn test_light_hit_only_scratches_shields() {
        let mut ship = target(20, 20, 3);
        let mut dice = ScriptedDice::default();
        let report = apply_hit(&mut ship, &Hit::new(4), &mut dice).unwrap();
        assert_eq!(report.damage, 1);
        assert_eq!(report.shields_after, 19);
        assert!(!report.shaken);
    }

    #[test]
    fn test_shields_down_breach_directly() {
        let mut ship = target(0, 20, 2);
        let mut dice = ScriptedDice::new([1]);
        let report = apply_hit(&mut ship, &Hit::new(3), &mut dice).unwrap();
        assert_eq!(report.breach.unwrap().system, SystemType::Comms);
        assert!(!report.shaken);
    }

    #[test]
    fn test_lowered_shields_act_as_down() {
        let mut ship = target(20, 20, 2);
        ship.shields_raised = false;
        let mut dice = ScriptedDice::new([20]);
        let report = apply_hit(&mut ship, &Hit::new(3), &mut dice).unwrap();
        assert_eq!(report.breach.unwrap().system, SystemType::Weapons);
        assert_eq!(ship.shields.current, 20);
    }

    #[test]
    fn test_piercing_skips_resistance() {
        let mut ship = target(20, 20, 5);
        let mut dice = ScriptedDice::default();
        let report = apply_hit(&mut ship, &Hit::new(6).piercing(), &mut dice).unwrap();
        assert_eq!(report.after_resistance, 6);
        assert_eq!(report.shields_after, 14);
    }

    #[test]
    fn test_complications_floor_at_one() {
        let mut ship = target(20, 20, 0);
        let hit = Hit {
            complications: 9,
            ..Hit::new(5)
        };
        let report = apply_hit(&mut ship, &hit, &mut ScriptedDice::default()).unwrap();
        assert_eq!(report.damage, 1);
    }

    #[test]
    fn test_depleting_never_shakes() {
        let mut ship = target(10, 20, 0);
        let hit = Hit {
            depleting: true,
            ..Hit::new(9)
        };
        let report = apply_hit(&mut ship, &hit, &mut ScriptedDice::default()).unwrap();
        assert_eq!(report.shields_after, 1);
        assert!(!report.shaken);
        assert!(report.breach.is_none());
        assert!(!ship.shaken);
    }

    #[test]
    fn test_chosen_system_rolls_nothing() {
        let mut ship = target(0, 20, 0);
        let hit = Hit {
            chosen_system: Some(SystemType::Engines),
            ..Hit::new(2)
        };
        let mut dice = ScriptedDice::new([1]);
        let report = apply_hit(&mut ship, &hit, &mut dice).unwrap();
        assert_eq!(report.breach.unwrap().system, SystemType::Engines);
        assert_eq!(report.hit_roll, None);
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn test_inconsistent_ship_rejected() {
        let mut ship = target(30, 20, 0);
        let result = apply_hit(&mut ship, &Hit::new(2), &mut ScriptedDice::default());
        assert!(result.unwrap_err().is_internal());
        assert_eq!(ship.shields.current, 30);
    }
}
