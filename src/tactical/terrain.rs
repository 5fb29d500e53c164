//! Space terrain and its effect on movement and sensors

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    #[default]
    Open,
    DustCloud,
    Nebula,
    DenseNebula,
    AsteroidField,
    DenseAsteroidField,
    IonStorm,
}

impl TerrainType {
    /// Momentum needed to leave a hex of this terrain
    pub fn movement_cost(&self) -> u32 {
        match self {
            TerrainType::Open => 0,
            TerrainType::DustCloud => 1,
            TerrainType::Nebula => 1,
            TerrainType::DenseNebula => 2,
            TerrainType::AsteroidField => 2,
            TerrainType::DenseAsteroidField => 3,
            TerrainType::IonStorm => 2,
        }
    }

    /// Leaving while paying in Threat inflicts damage
    pub fn is_hazardous(&self) -> bool {
        matches!(
            self,
            TerrainType::AsteroidField | TerrainType::DenseAsteroidField | TerrainType::IonStorm
        )
    }

    /// Ships inside cannot be seen from outside
    pub fn blocks_visibility(&self) -> bool {
        matches!(
            self,
            TerrainType::DustCloud | TerrainType::DenseNebula | TerrainType::IonStorm
        )
    }
}
