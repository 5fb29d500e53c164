//! Turn and round bookkeeping for one encounter
//!
//! `CombatState` owns the Momentum/Threat pools, the turn claim and the log.
//! Nothing here is global: two encounters never share state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::ActionSlot;
use crate::combat::log::{CombatEventType, CombatLogEntry, ParticipantTurnLog};
use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::core::pools::ResourcePools;
use crate::core::types::{EntityId, Round, Side};
use crate::task::TaskResult;

/// Which action slots the current turn has used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnSlots {
    pub major: bool,
    pub minor: bool,
}

impl TurnSlots {
    pub fn is_used(&self, slot: ActionSlot) -> bool {
        match slot {
            ActionSlot::Major => self.major,
            ActionSlot::Minor => self.minor,
        }
    }

    pub fn check(&self, slot: ActionSlot) -> Result<()> {
        if self.is_used(slot) {
            return Err(CombatError::Precondition(format!(
                "the {:?} action for this turn is already used",
                slot
            )));
        }
        Ok(())
    }

    pub fn mark(&mut self, slot: ActionSlot) {
        match slot {
            ActionSlot::Major => self.major = true,
            ActionSlot::Minor => self.minor = true,
        }
    }

    pub fn any_used(&self) -> bool {
        self.major || self.minor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub round: Round,
    /// Side currently holding the turn
    pub turn_side: Side,
    pub pools: ResourcePools,
    /// Participant holding the current turn, if any
    pub claim: Option<EntityId>,
    pub slots: TurnSlots,
    /// Monotonic turn counter across the encounter, starting at 1
    pub turn_seq: u64,
    /// Set when the acting side has paid to keep the initiative
    pub initiative_kept: bool,
    /// Side that kept the initiative last, until the opposition acts
    pub last_kept: Option<Side>,
    pub log: ParticipantTurnLog,
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatState {
    /// Round 1, players to act, Threat at its configured starting value
    pub fn new() -> Self {
        Self {
            round: 1,
            turn_side: Side::Player,
            pools: ResourcePools::new(0, config().starting_threat),
            claim: None,
            slots: TurnSlots::default(),
            turn_seq: 1,
            initiative_kept: false,
            last_kept: None,
            log: ParticipantTurnLog::new(),
        }
    }

    pub fn with_pools(mut self, pools: ResourcePools) -> Self {
        self.pools = pools;
        self
    }

    /// Check that `actor` on `side` may act now, without claiming anything
    pub fn check_turn(&self, actor: EntityId, side: Side) -> Result<()> {
        if side != self.turn_side {
            return Err(CombatError::NotYourTurn { actor, side });
        }
        match self.claim {
            Some(claimed_by) if claimed_by != actor => {
                Err(CombatError::TurnAlreadyClaimed { claimed_by })
            }
            _ => Ok(()),
        }
    }

    /// Atomically claim the current turn. The first claim wins.
    pub fn claim_turn(&mut self, actor: EntityId, side: Side) -> Result<()> {
        if side != self.turn_side {
            return Err(CombatError::NotYourTurn { actor, side });
        }
        if let Some(claimed_by) = self.claim {
            return Err(CombatError::TurnAlreadyClaimed { claimed_by });
        }
        self.claim = Some(actor);
        debug!(%actor, %side, "Turn claimed");
        Ok(())
    }

    /// Give up a claim on a turn that has not acted yet
    pub fn release_turn(&mut self, actor: EntityId) -> Result<()> {
        match self.claim {
            Some(claimed_by) if claimed_by == actor => {
                if self.slots.any_used() {
                    return Err(CombatError::Precondition(
                        "cannot release a turn that has already acted".into(),
                    ));
                }
                self.claim = None;
                Ok(())
            }
            Some(claimed_by) => Err(CombatError::TurnAlreadyClaimed { claimed_by }),
            None => Err(CombatError::Precondition(format!(
                "{} holds no turn claim",
                actor
            ))),
        }
    }

    /// Clear per-turn state and move the turn counter on.
    /// Returns the sequence number of the turn that completed.
    pub fn finish_turn(&mut self) -> u64 {
        let completed = self.turn_seq;
        self.turn_seq += 1;
        self.claim = None;
        self.slots = TurnSlots::default();
        completed
    }

    pub fn next_round(&mut self, first_side: Side) {
        self.round += 1;
        self.turn_side = first_side;
        self.claim = None;
        self.slots = TurnSlots::default();
        self.initiative_kept = false;
        self.last_kept = None;
    }

    pub fn record(
        &mut self,
        actor: Option<EntityId>,
        event: CombatEventType,
        description: impl Into<String>,
        task_result: Option<TaskResult>,
    ) {
        self.log.push(CombatLogEntry {
            round: self.round,
            side: self.turn_side,
            actor,
            event,
            description: description.into(),
            task_result,
        });
    }
}
