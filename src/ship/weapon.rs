//! Starship weapons

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    Energy,
    Torpedo,
}

impl WeaponType {
    pub fn attack_difficulty(&self) -> u8 {
        match self {
            WeaponType::Energy => 2,
            WeaponType::Torpedo => 3,
        }
    }
}

/// Range bands, measured in zones (hexes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeClass {
    Contact,
    Close,
    #[default]
    Medium,
    Long,
    Extreme,
}

impl RangeClass {
    /// Range band for a hex distance. Contact is never inferred from distance.
    pub fn from_distance(distance: u32) -> Self {
        match distance {
            0 => RangeClass::Close,
            1 => RangeClass::Medium,
            2 => RangeClass::Long,
            _ => RangeClass::Extreme,
        }
    }

    /// Farthest hex distance a weapon of this range can reach
    pub fn max_distance(&self) -> u32 {
        match self {
            RangeClass::Contact | RangeClass::Close => 0,
            RangeClass::Medium => 1,
            RangeClass::Long => 2,
            RangeClass::Extreme => u32::MAX,
        }
    }

    pub fn reaches(&self, distance: u32) -> bool {
        distance <= self.max_distance()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponQuality {
    /// +2 damage
    Salvo,
    /// Ignores resistance
    Piercing,
    /// Never leaves the target Shaken
    Depleting,
    /// +1 damage
    HighYield,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub weapon_type: WeaponType,
    /// Base damage before the Weapons rating bonus
    pub damage: u8,
    pub range: RangeClass,
    #[serde(default)]
    pub qualities: Vec<WeaponQuality>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, weapon_type: WeaponType, damage: u8, range: RangeClass) -> Self {
        Self {
            name: name.into(),
            weapon_type,
            damage,
            range,
            qualities: Vec::new(),
        }
    }

    pub fn with_quality(mut self, quality: WeaponQuality) -> Self {
        if !self.qualities.contains(&quality) {
            self.qualities.push(quality);
        }
        self
    }

    pub fn has(&self, quality: WeaponQuality) -> bool {
        self.qualities.contains(&quality)
    }

    pub fn attack_difficulty(&self) -> u8 {
        self.weapon_type.attack_difficulty()
    }

    pub fn quality_damage_bonus(&self) -> u32 {
        self.qualities
            .iter()
            .map(|q| match q {
                WeaponQuality::Salvo => 2,
                WeaponQuality::HighYield => 1,
                _ => 0,
            })
            .sum()
    }
}

/// Damage bonus granted by the Weapons system rating
pub fn weapons_damage_bonus(weapons_rating: u8) -> u32 {
    match weapons_rating {
        0..=6 => 0,
        7..=8 => 1,
        9..=10 => 2,
        11..=12 => 3,
        _ => 4,
    }
}
