pub mod config;
pub mod error;
pub mod pools;
pub mod types;

pub use config::{config, CombatConfig};
pub use error::{CombatError, Result};
pub use pools::ResourcePools;
pub use types::{EffectId, EntityId, Resource, Round, Side};
