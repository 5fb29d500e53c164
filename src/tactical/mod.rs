//! Hex-grid tactical model: coordinates, terrain, visibility and movement

pub mod hex;
pub mod map;
pub mod movement;
pub mod terrain;

pub use hex::HexCoord;
pub use map::{TacticalMap, TerrainTile};
pub use movement::{
    range_category, reachable, resolve_thrusters, validate_move, MoveMode, MovePayment, MovePlan,
    ThrustersAction,
};
pub use terrain::TerrainType;
