//! Ordered record of everything that happened in an encounter

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Round, Side};
use crate::task::TaskResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEventType {
    EncounterStarted,
    TurnClaimed,
    TurnReleased,
    Action { name: String },
    Attack { target: EntityId, weapon: String },
    Move,
    Hazard,
    Pass,
    TurnEnded,
    InitiativeKept,
    RoundEnded,
    WarpCoreBreach { ship: EntityId },
    ShipDestroyed { ship: EntityId },
    SceneEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub round: Round,
    pub side: Side,
    /// None for encounter-level events such as round ends
    pub actor: Option<EntityId>,
    pub event: CombatEventType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_result: Option<TaskResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTurnLog {
    entries: Vec<CombatLogEntry>,
}

impl ParticipantTurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CombatLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&CombatLogEntry> {
        self.entries.last()
    }

    /// Entries written by one participant
    pub fn by_actor(&self, actor: EntityId) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries.iter().filter(move |e| e.actor == Some(actor))
    }

    pub fn in_round(&self, round: Round) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries.iter().filter(move |e| e.round == round)
    }
}
