//! Turn/round orchestration for starship encounters

pub mod encounter;
pub mod log;
pub mod state;

pub use encounter::{Encounter, MoveFunding, MoveOutcome, Participant, RoundSummary};
pub use log::{CombatEventType, CombatLogEntry, ParticipantTurnLog};
pub use state::{CombatState, TurnSlots};
