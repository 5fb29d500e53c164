use thiserror::Error;

use crate::core::types::{EntityId, Resource, Side};

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Precondition not met: {0}")]
    Precondition(String),

    #[error("Not your turn: {actor} is on the {side} side")]
    NotYourTurn { actor: EntityId, side: Side },

    #[error("Turn already claimed by {claimed_by}")]
    TurnAlreadyClaimed { claimed_by: EntityId },

    #[error("Insufficient {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: Resource,
        needed: u32,
        available: u32,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(EntityId),

    #[error("Invalid roll: {0}")]
    InvalidRoll(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl CombatError {
    /// Concurrency/ordering violations (wrong side, slot taken)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            CombatError::NotYourTurn { .. } | CombatError::TurnAlreadyClaimed { .. }
        )
    }

    /// Defects that should never surface from valid input
    pub fn is_internal(&self) -> bool {
        matches!(self, CombatError::InvariantViolation(_))
    }

    /// A rejected action never spends the actor's turn allotment
    pub fn consumes_turn(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;
