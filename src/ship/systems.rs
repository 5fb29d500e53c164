//! Ship systems and the system-hit table

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    Comms,
    Computers,
    Engines,
    Sensors,
    Structure,
    Weapons,
}

impl SystemType {
    pub fn all() -> [SystemType; 6] {
        [
            SystemType::Comms,
            SystemType::Computers,
            SystemType::Engines,
            SystemType::Sensors,
            SystemType::Structure,
            SystemType::Weapons,
        ]
    }

    /// System struck by a d20 hit roll
    pub fn from_hit_roll(roll: u8) -> Self {
        match roll {
            0..=1 => SystemType::Comms,
            2 => SystemType::Computers,
            3..=6 => SystemType::Engines,
            7..=9 => SystemType::Sensors,
            10..=17 => SystemType::Structure,
            _ => SystemType::Weapons,
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SystemType::Comms => "Comms",
            SystemType::Computers => "Computers",
            SystemType::Engines => "Engines",
            SystemType::Sensors => "Sensors",
            SystemType::Structure => "Structure",
            SystemType::Weapons => "Weapons",
        };
        write!(f, "{}", name)
    }
}

/// System ratings (typically 7-12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Systems {
    pub comms: u8,
    pub computers: u8,
    pub engines: u8,
    pub sensors: u8,
    pub structure: u8,
    pub weapons: u8,
}

impl Default for Systems {
    fn default() -> Self {
        Self {
            comms: 7,
            computers: 7,
            engines: 7,
            sensors: 7,
            structure: 7,
            weapons: 7,
        }
    }
}

impl Systems {
    pub fn get(&self, system: SystemType) -> u8 {
        match system {
            SystemType::Comms => self.comms,
            SystemType::Computers => self.computers,
            SystemType::Engines => self.engines,
            SystemType::Sensors => self.sensors,
            SystemType::Structure => self.structure,
            SystemType::Weapons => self.weapons,
        }
    }
}
