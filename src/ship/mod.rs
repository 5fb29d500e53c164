//! Starships: systems, departments, weapons, shields and breaches

pub mod starship;
pub mod systems;
pub mod weapon;

pub use starship::{BreachOutcome, DamageState, Department, Departments, Shields, Starship};
pub use systems::{SystemType, Systems};
pub use weapon::{weapons_damage_bonus, RangeClass, Weapon, WeaponQuality, WeaponType};
