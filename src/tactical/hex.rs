//! Axial hex coordinates for the tactical map
//!
//! One hex is one zone. Distance goes through cube coordinates, so it is a
//! true metric on the grid.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Zones between two hexes
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Every hex within `range` zones, self included
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for dq in -range..=range {
            for dr in (-range).max(-dq - range)..=range.min(-dq + range) {
                results.push(HexCoord::new(self.q + dq, self.r + dr));
            }
        }
        results
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_hex() {
        let a = HexCoord::new(3, -1);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_distance_two_zones() {
        assert_eq!(HexCoord::new(0, 0).distance(&HexCoord::new(2, -1)), 2);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let c = HexCoord::new(1, 1);
        for n in c.neighbors() {
            assert_eq!(c.distance(&n), 1);
        }
    }

    #[test]
    fn test_hexes_in_range() {
        let center = HexCoord::new(0, 0);
        assert_eq!(center.hexes_in_range(0).len(), 1);
        assert_eq!(center.hexes_in_range(1).len(), 7);
        assert_eq!(center.hexes_in_range(2).len(), 19);
    }
}
