//! Damage and breach state machine
//!
//! Attacks, hazards and warp core explosions all land through the same
//! `apply_hit` pipeline.

pub mod attack;
pub mod hazard;
pub mod hit;
pub mod warp_core;

pub use attack::{resolve_attack, AttackContext, AttackOptions, DamageResult};
pub use hazard::{resolve_hazard, HazardReport};
pub use hit::{apply_hit, Hit, HitReport};
pub use warp_core::{check_warp_core, explosion_hit, WarpCoreCheck};
