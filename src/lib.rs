//! Starship Tactics - 2d20 starship combat rules core
//!
//! Task resolution, declarative bridge actions, the damage and breach state
//! machine, turn/round orchestration and hex-grid movement. Every random
//! number comes from a `DiceSource`, so encounters replay exactly.

pub mod actions;
pub mod combat;
pub mod core;
pub mod crew;
pub mod damage;
pub mod dice;
pub mod effects;
pub mod ship;
pub mod tactical;
pub mod task;
