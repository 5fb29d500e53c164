//! Tactical map: terrain by hex, plus sensor detections

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::tactical::hex::HexCoord;
use crate::tactical::terrain::TerrainType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainTile {
    pub coord: HexCoord,
    pub terrain: TerrainType,
}

impl TerrainTile {
    pub fn movement_cost(&self) -> u32 {
        self.terrain.movement_cost()
    }

    pub fn is_hazardous(&self) -> bool {
        self.terrain.is_hazardous()
    }

    pub fn blocks_visibility(&self) -> bool {
        self.terrain.blocks_visibility()
    }
}

/// A hex-shaped map of `radius` zones around the origin. Hexes without an
/// explicit tile are open space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticalMap {
    pub radius: u32,
    #[serde(with = "tile_list")]
    tiles: AHashMap<HexCoord, TerrainTile>,
    /// Hexes revealed by an active scan
    #[serde(default)]
    detected: AHashSet<HexCoord>,
}

impl TacticalMap {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            tiles: AHashMap::new(),
            detected: AHashSet::new(),
        }
    }

    pub fn in_bounds(&self, coord: HexCoord) -> bool {
        HexCoord::default().distance(&coord) <= self.radius
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: TerrainType) {
        if terrain == TerrainType::Open {
            self.tiles.remove(&coord);
        } else {
            self.tiles.insert(coord, TerrainTile { coord, terrain });
        }
    }

    pub fn with_terrain(mut self, coord: HexCoord, terrain: TerrainType) -> Self {
        self.set_terrain(coord, terrain);
        self
    }

    pub fn terrain_at(&self, coord: HexCoord) -> TerrainType {
        self.tiles
            .get(&coord)
            .map(|t| t.terrain)
            .unwrap_or_default()
    }

    pub fn tile(&self, coord: HexCoord) -> TerrainTile {
        TerrainTile {
            coord,
            terrain: self.terrain_at(coord),
        }
    }

    /// Non-open tiles, in coordinate order
    pub fn tiles(&self) -> Vec<TerrainTile> {
        let mut tiles: Vec<_> = self.tiles.values().copied().collect();
        tiles.sort_by_key(|t| t.coord);
        tiles
    }

    pub fn mark_detected(&mut self, coord: HexCoord) {
        self.detected.insert(coord);
    }

    pub fn clear_detections(&mut self) {
        self.detected.clear();
    }

    pub fn is_detected(&self, coord: HexCoord) -> bool {
        self.detected.contains(&coord)
    }

    /// Can an observer at `observer` see a ship at `target`?
    pub fn is_visible(&self, observer: HexCoord, target: HexCoord) -> bool {
        observer == target || !self.terrain_at(target).blocks_visibility() || self.is_detected(target)
    }
}

impl PartialEq for TacticalMap {
    fn eq(&self, other: &Self) -> bool {
        let mut a: Vec<_> = self.detected.iter().copied().collect();
        let mut b: Vec<_> = other.detected.iter().copied().collect();
        a.sort();
        b.sort();
        self.radius == other.radius && self.tiles() == other.tiles() && a == b
    }
}

/// Tiles keyed by coordinate serialize as a plain list; struct keys are not
/// valid JSON object keys.
mod tile_list {
    use super::{HexCoord, TerrainTile};
    use ahash::AHashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        tiles: &AHashMap<HexCoord, TerrainTile>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut list: Vec<&TerrainTile> = tiles.values().collect();
        list.sort_by_key(|t| t.coord);
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<AHashMap<HexCoord, TerrainTile>, D::Error> {
        let list = Vec::<TerrainTile>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|t| (t.coord, t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_hex_is_open() {
        let map = TacticalMap::new(3);
        assert_eq!(map.terrain_at(HexCoord::new(1, 1)), TerrainType::Open);
    }

    #[test]
    fn test_bounds() {
        let map = TacticalMap::new(2);
        assert!(map.in_bounds(HexCoord::new(2, -1)));
        assert!(!map.in_bounds(HexCoord::new(3, 0)));
    }

    #[test]
    fn test_visibility_in_dust_cloud() {
        let cloud = HexCoord::new(1, 0);
        let mut map = TacticalMap::new(3).with_terrain(cloud, TerrainType::DustCloud);
        assert!(!map.is_visible(HexCoord::new(0, 0), cloud));
        assert!(map.is_visible(cloud, cloud));
        map.mark_detected(cloud);
        assert!(map.is_visible(HexCoord::new(0, 0), cloud));
    }

    #[test]
    fn test_map_json_round_trip() {
        let mut map = TacticalMap::new(4)
            .with_terrain(HexCoord::new(1, 0), TerrainType::Nebula)
            .with_terrain(HexCoord::new(-1, 2), TerrainType::IonStorm);
        map.mark_detected(HexCoord::new(-1, 2));
        let json = serde_json::to_string(&map).unwrap();
        let back: TacticalMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
