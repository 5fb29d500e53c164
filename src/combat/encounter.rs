//! Turn/round orchestrator
//!
//! An `Encounter` owns every ship, character and participant in one fight
//! plus its `CombatState`. Each public operation either completes and logs, or
//! returns an error having changed nothing the caller can observe. Errors never
//! consume the actor's turn.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actions::{engine, ActionKind, ActionOutcome, ActionRegistry, ActionRequest, ActionSlot};
use crate::combat::log::CombatEventType;
use crate::combat::state::CombatState;
use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::core::types::{EntityId, Round, Side};
use crate::crew::{Actor, Character};
use crate::damage::{
    self, apply_hit, check_warp_core, explosion_hit, resolve_hazard, AttackContext, AttackOptions,
    DamageResult, HazardReport, HitReport, WarpCoreCheck,
};
use crate::dice::DiceSource;
use crate::ship::{Starship, SystemType};
use crate::tactical::{
    resolve_thrusters, validate_move, HexCoord, MoveMode, MovePayment, MovePlan, TacticalMap,
    ThrustersAction,
};

/// Someone who takes turns: a player character or an NPC ship's crew
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: EntityId,
    pub name: String,
    pub side: Side,
    /// The ship this participant acts through
    pub ship: EntityId,
    /// None for NPC ships, which roll with their crew quality
    pub character: Option<EntityId>,
    pub turns_per_round: u32,
    #[serde(default)]
    pub turns_taken: u32,
}

impl Participant {
    pub fn turns_left(&self) -> u32 {
        self.turns_per_round.saturating_sub(self.turns_taken)
    }
}

/// How a move is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFunding {
    #[default]
    Momentum,
    /// Players add to Threat; the GM spends it
    Threat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub plan: MovePlan,
    pub hazards: Vec<HazardReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// The round that ended
    pub round: Round,
    pub effects_expired: usize,
    pub warp_checks: Vec<WarpCoreCheck>,
    /// Ships caught in a warp core explosion
    pub collateral: Vec<(EntityId, HitReport)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub state: CombatState,
    pub ships: Vec<Starship>,
    pub characters: Vec<Character>,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub map: Option<TacticalMap>,
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new(None)
    }
}

fn index_of<T>(items: &[T], id: EntityId, key: impl Fn(&T) -> EntityId) -> Result<usize> {
    items
        .iter()
        .position(|item| key(item) == id)
        .ok_or(CombatError::UnknownParticipant(id))
}

/// Two distinct ships, both mutable
fn ship_pair(ships: &mut [Starship], a: usize, b: usize) -> Result<(&mut Starship, &mut Starship)> {
    if a == b {
        return Err(CombatError::Precondition("a ship cannot target itself".into()));
    }
    if a < b {
        let (left, right) = ships.split_at_mut(b);
        Ok((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = ships.split_at_mut(a);
        Ok((&mut right[0], &mut left[b]))
    }
}

impl Encounter {
    pub fn new(map: Option<TacticalMap>) -> Self {
        Self {
            state: CombatState::new(),
            ships: Vec::new(),
            characters: Vec::new(),
            participants: Vec::new(),
            map,
        }
    }

    // ===== SETUP =====

    pub fn add_ship(&mut self, ship: Starship) -> EntityId {
        let id = ship.id;
        self.ships.push(ship);
        id
    }

    /// Seat a player character aboard a ship. One turn per round.
    pub fn add_player(&mut self, character: Character, ship: EntityId) -> Result<EntityId> {
        index_of(&self.ships, ship, |s| s.id)?;
        let id = character.id;
        self.participants.push(Participant {
            id,
            name: character.name.clone(),
            side: Side::Player,
            ship,
            character: Some(id),
            turns_per_round: 1,
            turns_taken: 0,
        });
        self.characters.push(character);
        Ok(id)
    }

    /// Enlist an NPC ship. It takes Scale turns per round.
    pub fn add_npc(&mut self, ship: EntityId) -> Result<EntityId> {
        let idx = index_of(&self.ships, ship, |s| s.id)?;
        let npc = &self.ships[idx];
        self.participants.push(Participant {
            id: ship,
            name: npc.name.clone(),
            side: Side::Enemy,
            ship,
            character: None,
            turns_per_round: npc.turns_per_round(),
            turns_taken: 0,
        });
        Ok(ship)
    }

    pub fn start(&mut self) {
        let names: Vec<&str> = self.ships.iter().map(|s| s.name.as_str()).collect();
        let description = format!("Encounter begins: {}", names.join(" vs "));
        info!("{}", description);
        self.state
            .record(None, CombatEventType::EncounterStarted, description, None);
    }

    // ===== LOOKUP =====

    pub fn ship(&self, id: EntityId) -> Result<&Starship> {
        index_of(&self.ships, id, |s| s.id).map(|i| &self.ships[i])
    }

    pub fn ship_mut(&mut self, id: EntityId) -> Result<&mut Starship> {
        let idx = index_of(&self.ships, id, |s| s.id)?;
        Ok(&mut self.ships[idx])
    }

    pub fn character(&self, id: EntityId) -> Result<&Character> {
        index_of(&self.characters, id, |c| c.id).map(|i| &self.characters[i])
    }

    pub fn participant(&self, id: EntityId) -> Result<&Participant> {
        index_of(&self.participants, id, |p| p.id).map(|i| &self.participants[i])
    }

    /// Can this participant still take turns?
    fn is_active(&self, participant: &Participant) -> bool {
        let ship_ok = self.ship(participant.ship).is_ok_and(|s| s.can_act());
        let crew_ok = participant
            .character
            .map_or(true, |c| self.character(c).is_ok_and(|c| !c.is_defeated()));
        ship_ok && crew_ok
    }

    pub fn turns_remaining(&self, side: Side) -> u32 {
        self.participants
            .iter()
            .filter(|p| p.side == side && self.is_active(p))
            .map(|p| p.turns_left())
            .sum()
    }

    /// The claimant, or else the first participant able to take the current turn
    pub fn next_actor(&self) -> Option<EntityId> {
        self.state.claim.or_else(|| {
            self.participants
                .iter()
                .find(|p| p.side == self.state.turn_side && p.turns_left() > 0 && self.is_active(p))
                .map(|p| p.id)
        })
    }

    /// The side left standing, once the other has nothing able to act
    pub fn winner(&self) -> Option<Side> {
        let standing = |side: Side| {
            self.participants
                .iter()
                .any(|p| p.side == side && self.is_active(p))
        };
        match (standing(Side::Player), standing(Side::Enemy)) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            _ => None,
        }
    }

    /// Can `observer`'s ship see `target`'s ship?
    pub fn is_visible(&self, observer: EntityId, target: EntityId) -> Result<bool> {
        let from = self.ship(observer)?.position;
        let to = self.ship(target)?.position;
        Ok(self.map.as_ref().map_or(true, |m| m.is_visible(from, to)))
    }

    /// Reveal a hex to sensors until the round ends
    pub fn mark_detected(&mut self, coord: HexCoord) -> Result<()> {
        let map = self
            .map
            .as_mut()
            .ok_or_else(|| CombatError::Precondition("encounter has no tactical map".into()))?;
        map.mark_detected(coord);
        Ok(())
    }

    // ===== TURN CONTROL =====

    /// Check that `actor` may act now. Returns its participant index.
    fn authorize(&self, actor: EntityId) -> Result<usize> {
        let idx = index_of(&self.participants, actor, |p| p.id)?;
        let participant = &self.participants[idx];
        self.state.check_turn(actor, participant.side)?;
        if !self.is_active(participant) {
            return Err(CombatError::Precondition(format!(
                "{} is out of the fight",
                participant.name
            )));
        }
        if participant.turns_left() == 0 {
            return Err(CombatError::Precondition(format!(
                "{} has no turns left this round",
                participant.name
            )));
        }
        Ok(idx)
    }

    pub fn claim_turn(&mut self, actor: EntityId) -> Result<()> {
        let idx = self.authorize(actor)?;
        let side = self.participants[idx].side;
        self.state.claim_turn(actor, side)?;
        let description = format!("{} takes the turn", self.participants[idx].name);
        self.state
            .record(Some(actor), CombatEventType::TurnClaimed, description, None);
        Ok(())
    }

    pub fn release_turn(&mut self, actor: EntityId) -> Result<()> {
        self.state.release_turn(actor)?;
        self.state.record(
            Some(actor),
            CombatEventType::TurnReleased,
            "Turn released",
            None,
        );
        Ok(())
    }

    /// Pay to let the acting side go again after this turn
    pub fn keep_initiative(&mut self, actor: EntityId) -> Result<()> {
        let idx = self.authorize(actor)?;
        let side = self.participants[idx].side;
        if self.state.initiative_kept {
            return Err(CombatError::Precondition(
                "initiative already kept this turn".into(),
            ));
        }
        if self.state.last_kept == Some(side) {
            return Err(CombatError::Precondition(
                "cannot keep the initiative twice in a row".into(),
            ));
        }
        // The current turn still counts as remaining
        if self.turns_remaining(side) < 2 {
            return Err(CombatError::Precondition(format!(
                "{} has no further turns to take",
                side
            )));
        }

        let cost = config().keep_initiative_cost as u32;
        self.state.pools.spend_for(side, cost)?;
        self.state.claim.get_or_insert(actor);
        self.state.initiative_kept = true;
        self.state.record(
            Some(actor),
            CombatEventType::InitiativeKept,
            format!("{} keeps the initiative", self.participants[idx].name),
            None,
        );
        Ok(())
    }

    /// Finish the actor's turn, e.g. after only a minor action
    pub fn end_turn(&mut self, actor: EntityId, dice: &mut impl DiceSource) -> Result<Option<RoundSummary>> {
        let idx = self.authorize(actor)?;
        if self.state.claim != Some(actor) {
            return Err(CombatError::Precondition(format!(
                "{} has not started a turn",
                self.participants[idx].name
            )));
        }
        self.complete_turn(idx, dice)
    }

    pub fn pass(&mut self, actor: EntityId, dice: &mut impl DiceSource) -> Result<Option<RoundSummary>> {
        let idx = self.authorize(actor)?;
        self.state.claim.get_or_insert(actor);
        let description = format!("{} passes", self.participants[idx].name);
        self.state
            .record(Some(actor), CombatEventType::Pass, description, None);
        self.complete_turn(idx, dice)
    }

    fn complete_turn(&mut self, idx: usize, dice: &mut impl DiceSource) -> Result<Option<RoundSummary>> {
        let actor = self.participants[idx].id;
        let side = self.participants[idx].side;
        self.participants[idx].turns_taken += 1;

        let completed = self.state.finish_turn();
        let expired: usize = self
            .ships
            .iter_mut()
            .map(|s| s.effects.purge_end_of_turn(completed))
            .sum();
        if expired > 0 {
            debug!(expired, turn = completed, "End-of-turn effects expired");
        }

        if self.state.last_kept.is_some_and(|s| s != side) {
            self.state.last_kept = None;
        }
        if self.state.initiative_kept {
            self.state.last_kept = Some(side);
        }

        self.state.record(
            Some(actor),
            CombatEventType::TurnEnded,
            format!("{} ends their turn", self.participants[idx].name),
            None,
        );
        self.hand_over(dice)
    }

    /// Move play on. A claimed turn is completed for its claimant first;
    /// otherwise the turn goes straight to the next side.
    pub fn advance_turn(&mut self, dice: &mut impl DiceSource) -> Result<Option<RoundSummary>> {
        match self.state.claim {
            Some(actor) => {
                let idx = index_of(&self.participants, actor, |p| p.id)?;
                self.complete_turn(idx, dice)
            }
            None => self.hand_over(dice),
        }
    }

    /// Hand the turn to the next side. Sides alternate while both have turns;
    /// a kept initiative holds the turn on the same side. When nobody has
    /// turns left the round ends.
    fn hand_over(&mut self, dice: &mut impl DiceSource) -> Result<Option<RoundSummary>> {
        let current = self.state.turn_side;
        let other = current.opponent();
        let kept = std::mem::take(&mut self.state.initiative_kept);

        let next = if kept && self.turns_remaining(current) > 0 {
            Some(current)
        } else if self.turns_remaining(other) > 0 {
            Some(other)
        } else if self.turns_remaining(current) > 0 {
            Some(current)
        } else {
            None
        };

        match next {
            Some(side) => {
                self.state.turn_side = side;
                debug!(%side, "Turn passes");
                Ok(None)
            }
            None => self.end_round(dice).map(Some),
        }
    }

    /// Round boundary: expire round effects, clear Shaken, check warp cores
    pub fn end_round(&mut self, dice: &mut impl DiceSource) -> Result<RoundSummary> {
        let round = self.state.round;
        let mut summary = RoundSummary {
            round,
            effects_expired: 0,
            warp_checks: Vec::new(),
            collateral: Vec::new(),
        };

        for ship in &mut self.ships {
            summary.effects_expired += ship.effects.purge_end_of_round();
            ship.shaken = false;
        }

        for i in 0..self.ships.len() {
            let Some(check) = check_warp_core(&mut self.ships[i], dice) else {
                continue;
            };
            if check.exploded {
                let (position, scale, name) = {
                    let ship = &self.ships[i];
                    (ship.position, ship.scale, ship.name.clone())
                };
                self.state.record(
                    None,
                    CombatEventType::WarpCoreBreach {
                        ship: self.ships[i].id,
                    },
                    format!("{}'s warp core explodes", name),
                    None,
                );
                let blast = explosion_hit(scale);
                for j in 0..self.ships.len() {
                    let other = &mut self.ships[j];
                    if j == i || other.destroyed || other.position != position {
                        continue;
                    }
                    let report = apply_hit(other, &blast, dice)?;
                    warn!(ship = %other.name, damage = report.damage, "Caught in warp core explosion");
                    summary.collateral.push((other.id, report));
                }
            }
            summary.warp_checks.push(check);
        }

        if let Some(map) = self.map.as_mut() {
            map.clear_detections();
        }
        for p in &mut self.participants {
            p.turns_taken = 0;
        }

        let first = if self.turns_remaining(Side::Player) > 0 {
            Side::Player
        } else {
            Side::Enemy
        };
        self.state.record(
            None,
            CombatEventType::RoundEnded,
            format!("Round {} ends", round),
            None,
        );
        self.state.next_round(first);
        info!(round = self.state.round, "Round begins");
        Ok(summary)
    }

    /// Momentum drains by one when the scene ends
    pub fn end_scene(&mut self) {
        self.state.pools.momentum = self.state.pools.momentum.saturating_sub(1);
        self.state.record(
            None,
            CombatEventType::SceneEnded,
            format!("Scene ends, {} Momentum remains", self.state.pools.momentum),
            None,
        );
    }

    // ===== ACTIONS =====

    /// Crew member or NPC crew rolling for a participant
    fn actor_for<'a>(
        characters: &'a [Character],
        participant: &Participant,
        ship: &Starship,
    ) -> Result<Actor<'a>> {
        match participant.character {
            Some(id) => {
                let idx = index_of(characters, id, |c| c.id)?;
                Ok(Actor::Character(&characters[idx]))
            }
            None => Ok(Actor::Crew(ship.crew_quality.unwrap_or_default())),
        }
    }

    /// Run a named bridge action for `actor`. A major action or a Pass ends the turn.
    pub fn execute_action(
        &mut self,
        registry: &ActionRegistry,
        actor: EntityId,
        request: &ActionRequest,
        dice: &mut impl DiceSource,
    ) -> Result<ActionOutcome> {
        let idx = self.authorize(actor)?;
        let action = registry.get(&request.action)?;
        self.state.slots.check(action.slot)?;

        let participant = self.participants[idx].clone();
        let ship_idx = index_of(&self.ships, participant.ship, |s| s.id)?;
        let outcome = {
            let actor_ref = Self::actor_for(&self.characters, &participant, &self.ships[ship_idx])?;
            let mut ctx = engine::ActionContext {
                ship: &mut self.ships[ship_idx],
                actor: actor_ref,
                side: participant.side,
                pools: &mut self.state.pools,
                turn: self.state.turn_seq,
            };
            engine::execute_action(registry, &mut ctx, request, dice)?
        };

        self.state.claim.get_or_insert(actor);
        self.state.slots.mark(action.slot);
        let verdict = match &outcome.task_result {
            Some(r) if r.succeeded => "succeeds",
            Some(_) => "fails",
            None => "is carried out",
        };
        self.state.record(
            Some(actor),
            CombatEventType::Action {
                name: action.name.clone(),
            },
            format!("{}: {} {}", participant.name, action.name, verdict),
            outcome.task_result.clone(),
        );

        if matches!(action.kind, ActionKind::Pass) || action.slot == ActionSlot::Major {
            self.complete_turn(idx, dice)?;
        }
        Ok(outcome)
    }

    /// Fire a weapon at another ship. Attacks are major actions.
    pub fn resolve_attack(
        &mut self,
        actor: EntityId,
        target: EntityId,
        weapon_index: usize,
        options: &AttackOptions,
        dice: &mut impl DiceSource,
    ) -> Result<DamageResult> {
        let idx = self.authorize(actor)?;
        self.state.slots.check(ActionSlot::Major)?;

        let participant = self.participants[idx].clone();
        let attacker_idx = index_of(&self.ships, participant.ship, |s| s.id)?;
        let defender_idx = index_of(&self.ships, target, |s| s.id)?;
        if !self.is_visible(participant.ship, target)? {
            return Err(CombatError::Precondition(format!(
                "{} cannot be detected",
                self.ships[defender_idx].name
            )));
        }

        let result = {
            let quality = self.ships[attacker_idx].crew_quality.unwrap_or_default();
            let actor_ref = match participant.character {
                Some(id) => Actor::Character(&self.characters[index_of(&self.characters, id, |c| c.id)?]),
                None => Actor::Crew(quality),
            };
            let (attacker, defender) = ship_pair(&mut self.ships, attacker_idx, defender_idx)?;
            let mut ctx = AttackContext {
                attacker,
                defender,
                actor: actor_ref,
                side: participant.side,
                pools: &mut self.state.pools,
            };
            damage::resolve_attack(&mut ctx, weapon_index, options, dice)?
        };

        self.state.claim.get_or_insert(actor);
        self.state.slots.mark(ActionSlot::Major);
        let defender_name = self.ships[defender_idx].name.clone();
        let description = match &result.hit {
            Some(hit) => format!(
                "{} hits {} with {} for {} damage",
                participant.name, defender_name, result.weapon, hit.damage
            ),
            None => format!(
                "{} misses {} with {}",
                participant.name, defender_name, result.weapon
            ),
        };
        self.state.record(
            Some(actor),
            CombatEventType::Attack {
                target,
                weapon: result.weapon.clone(),
            },
            description,
            Some(result.task_result.clone()),
        );
        if self.ships[defender_idx].destroyed {
            self.state.record(
                Some(actor),
                CombatEventType::ShipDestroyed { ship: target },
                format!("{} is destroyed", defender_name),
                None,
            );
        }

        self.complete_turn(idx, dice)?;
        Ok(result)
    }

    /// Move the actor's ship. Movement is a minor action.
    pub fn move_ship(
        &mut self,
        actor: EntityId,
        destination: HexCoord,
        mode: MoveMode,
        funding: MoveFunding,
        dice: &mut impl DiceSource,
    ) -> Result<MoveOutcome> {
        let idx = self.authorize(actor)?;
        self.state.slots.check(ActionSlot::Minor)?;
        let participant = self.participants[idx].clone();
        let ship_idx = index_of(&self.ships, participant.ship, |s| s.id)?;

        let map = self
            .map
            .as_ref()
            .ok_or_else(|| CombatError::Precondition("encounter has no tactical map".into()))?;
        let ship = &self.ships[ship_idx];
        if !ship.can_act() {
            return Err(CombatError::Precondition(format!(
                "{} is too badly damaged to maneuver",
                ship.name
            )));
        }
        if mode == MoveMode::Impulse && ship.is_system_destroyed(SystemType::Engines) {
            return Err(CombatError::Precondition(format!(
                "{} has no working engines",
                ship.name
            )));
        }
        ship.check_invariants()?;

        let pools = &self.state.pools;
        let payment = match (participant.side, funding) {
            (Side::Player, MoveFunding::Momentum) => MovePayment::Momentum(pools.momentum),
            (Side::Player, MoveFunding::Threat) => MovePayment::AddThreat,
            (Side::Enemy, _) => MovePayment::SpendThreat(pools.threat),
        };
        let plan = validate_move(ship.position, destination, map, mode, payment)?;

        match payment {
            MovePayment::Momentum(_) => self.state.pools.spend_momentum(plan.cost)?,
            MovePayment::SpendThreat(_) => self.state.pools.spend_threat(plan.cost)?,
            MovePayment::AddThreat => self.state.pools.add_threat(plan.cost),
        }

        let mover = participant.ship;
        if plan.from != plan.to {
            for other in &mut self.ships {
                if other.contact == Some(mover) {
                    other.contact = None;
                }
            }
            let ship = &mut self.ships[ship_idx];
            ship.contact = None;
            ship.position = plan.to;
        }

        let per_hex = config().hazard_dice_per_hex as u32;
        let mut hazards = Vec::new();
        for _ in &plan.hazard_hexes {
            hazards.push(resolve_hazard(&mut self.ships[ship_idx], per_hex, dice)?);
        }

        self.state.claim.get_or_insert(actor);
        self.state.slots.mark(ActionSlot::Minor);
        self.state.record(
            Some(actor),
            CombatEventType::Move,
            format!(
                "{} moves from {} to {} ({} paid)",
                participant.name, plan.from, plan.to, plan.cost
            ),
            None,
        );
        if !hazards.is_empty() {
            let total: u32 = hazards.iter().map(|h| h.total).sum();
            self.state.record(
                Some(actor),
                CombatEventType::Hazard,
                format!("Hazards deal {} damage to {}", total, self.ships[ship_idx].name),
                None,
            );
        }

        Ok(MoveOutcome { plan, hazards })
    }

    /// Enter or leave Contact with a ship in the same zone. A free minor action.
    pub fn thrusters(&mut self, actor: EntityId, action: ThrustersAction) -> Result<Option<EntityId>> {
        let idx = self.authorize(actor)?;
        self.state.slots.check(ActionSlot::Minor)?;
        let participant = self.participants[idx].clone();
        let ship_idx = index_of(&self.ships, participant.ship, |s| s.id)?;

        let ship = &self.ships[ship_idx];
        let in_hex: Vec<EntityId> = self
            .ships
            .iter()
            .filter(|s| s.id != ship.id && !s.destroyed && s.position == ship.position)
            .map(|s| s.id)
            .collect();
        let contact = resolve_thrusters(action, ship.contact, &in_hex)?;

        let (target, description) = match action {
            ThrustersAction::EnterContact(t) => (t, format!("{} moves into contact", participant.name)),
            ThrustersAction::ExitContact(t) => (t, format!("{} breaks contact", participant.name)),
        };
        let target_idx = index_of(&self.ships, target, |s| s.id)?;
        self.ships[ship_idx].contact = contact;
        self.ships[target_idx].contact = contact.map(|_| participant.ship);

        self.state.claim.get_or_insert(actor);
        self.state.slots.mark(ActionSlot::Minor);
        self.state
            .record(Some(actor), CombatEventType::Move, description, None);
        Ok(contact)
    }

    // ===== SNAPSHOTS =====

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let encounter: Encounter = serde_json::from_str(json)?;
        for ship in &encounter.ships {
            ship.check_invariants()?;
        }
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{Attributes, Disciplines};
    use crate::dice::ScriptedDice;
    use crate::effects::{ActiveEffect, AppliesTo, EffectDuration, EffectModifiers, EffectSpec};
    use crate::ship::{Departments, RangeClass, Shields, Systems, Weapon, WeaponType};
    use crate::tactical::TerrainType;

    fn setup() -> (Encounter, EntityId, EntityId, EntityId) {
        let mut encounter = Encounter::new(Some(TacticalMap::new(4)));
        let player_ship = encounter.add_ship(
            Starship::new("Resolute", 4, Systems::default(), Departments::default())
                .with_weapon(Weapon::new("Phasers", WeaponType::Energy, 6, RangeClass::Medium)),
        );
        let npc_ship = encounter.add_ship(
            Starship::new("Raider", 2, Systems::default(), Departments::default())
                .with_weapon(Weapon::new("Disruptors", WeaponType::Energy, 5, RangeClass::Medium))
                .at(HexCoord::new(1, 0)),
        );
        let captain = encounter
            .add_player(
                Character::new("Captain", Attributes::default(), Disciplines::default()),
                player_ship,
            )
            .unwrap();
        encounter.add_npc(npc_ship).unwrap();
        encounter.start();
        (encounter, captain, player_ship, npc_ship)
    }

    #[test]
    fn test_enemy_cannot_act_on_player_turn() {
        let (mut encounter, _, _, npc) = setup();
        let err = encounter.claim_turn(npc).unwrap_err();
        assert!(matches!(err, CombatError::NotYourTurn { .. }));
    }

    #[test]
    fn test_unknown_actor_rejected() {
        let (mut encounter, _, _, _) = setup();
        let stranger = EntityId::new();
        let err = encounter.claim_turn(stranger).unwrap_err();
        assert!(matches!(err, CombatError::UnknownParticipant(id) if id == stranger));
    }

    #[test]
    fn test_sides_alternate_then_round_advances() {
        let (mut encounter, captain, _, npc) = setup();
        let mut dice = ScriptedDice::default();

        encounter.pass(captain, &mut dice).unwrap();
        assert_eq!(encounter.state.turn_side, Side::Enemy);

        // Player side is out of turns, so the NPC takes both of its turns
        encounter.pass(npc, &mut dice).unwrap();
        assert_eq!(encounter.state.turn_side, Side::Enemy);
        let summary = encounter.pass(npc, &mut dice).unwrap().unwrap();

        assert_eq!(summary.round, 1);
        assert_eq!(encounter.state.round, 2);
        assert_eq!(encounter.state.turn_side, Side::Player);
    }

    #[test]
    fn test_advance_turn_completes_the_claimed_turn() {
        let (mut encounter, captain, _, npc) = setup();
        let mut dice = ScriptedDice::default();
        encounter.claim_turn(captain).unwrap();

        encounter.advance_turn(&mut dice).unwrap();
        assert_eq!(encounter.state.turn_side, Side::Enemy);
        assert!(encounter.state.claim.is_none());
        assert_eq!(encounter.participant(captain).unwrap().turns_taken, 1);

        encounter.claim_turn(npc).unwrap();
        assert_eq!(encounter.next_actor(), Some(npc));
    }

    #[test]
    fn test_out_of_fight_participant_cannot_act() {
        let (mut encounter, _, _, npc) = setup();
        let mut dice = ScriptedDice::default();
        encounter.state.turn_side = Side::Enemy;
        encounter.state.pools.threat = 4;
        {
            let raider = encounter.ship_mut(npc).unwrap();
            raider.apply_breach(SystemType::Engines);
            raider.apply_breach(SystemType::Comms);
            raider.apply_breach(SystemType::Sensors);
            assert!(raider.is_critically_damaged());
        }
        assert!(encounter.participant(npc).unwrap().turns_left() > 0);

        let err = encounter.claim_turn(npc).unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));
        let err = encounter.pass(npc, &mut dice).unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));
        let err = encounter.keep_initiative(npc).unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));
        assert!(encounter.state.claim.is_none());
        assert_eq!(encounter.state.pools.threat, 4);
    }

    #[test]
    fn test_end_of_turn_effect_gone_once_turn_completes() {
        let (mut encounter, captain, ship, npc) = setup();
        let spec = EffectSpec {
            applies_to: AppliesTo::Defense,
            duration: EffectDuration::EndOfTurn,
            modifiers: EffectModifiers {
                resistance_bonus: Some(1),
                ..EffectModifiers::default()
            },
        };
        let turn = encounter.state.turn_seq;
        for owner in [ship, npc] {
            let effect = ActiveEffect::from_spec(owner, "Brace", &spec, turn);
            encounter.ship_mut(owner).unwrap().effects.add(effect);
        }

        encounter.pass(captain, &mut ScriptedDice::default()).unwrap();
        assert!(encounter.ship(ship).unwrap().effects.is_empty());
        assert!(encounter.ship(npc).unwrap().effects.is_empty());
    }

    #[test]
    fn test_next_actor_follows_turn_side() {
        let (mut encounter, captain, _, npc) = setup();
        assert_eq!(encounter.next_actor(), Some(captain));
        encounter.pass(captain, &mut ScriptedDice::default()).unwrap();
        assert_eq!(encounter.next_actor(), Some(npc));
    }

    #[test]
    fn test_turn_allotment_enforced() {
        let (mut encounter, captain, _, npc) = setup();
        let mut dice = ScriptedDice::default();
        encounter.pass(captain, &mut dice).unwrap();
        encounter.pass(npc, &mut dice).unwrap();
        assert_eq!(encounter.participant(npc).unwrap().turns_left(), 1);
        assert_eq!(encounter.participant(captain).unwrap().turns_left(), 0);
    }

    #[test]
    fn test_failed_action_keeps_turn() {
        let (mut encounter, captain, ship, _) = setup();
        let registry = ActionRegistry::builtin().unwrap();
        encounter.ship_mut(ship).unwrap().reserve_power = false;
        let mut dice = ScriptedDice::default();

        let err = encounter
            .execute_action(&registry, captain, &ActionRequest::new("Reroute Power"), &mut dice)
            .unwrap_err();
        assert!(!err.consumes_turn());
        assert_eq!(encounter.state.turn_side, Side::Player);
        assert!(encounter.state.claim.is_none());
        assert_eq!(encounter.participant(captain).unwrap().turns_taken, 0);
    }

    #[test]
    fn test_minor_then_major_ends_turn() {
        let (mut encounter, captain, ship, _) = setup();
        let registry = ActionRegistry::builtin().unwrap();
        let mut dice = ScriptedDice::default();

        encounter
            .execute_action(&registry, captain, &ActionRequest::new("Calibrate Sensors"), &mut dice)
            .unwrap();
        assert_eq!(encounter.state.claim, Some(captain));
        let err = encounter
            .execute_action(&registry, captain, &ActionRequest::new("Reroute Power"), &mut dice)
            .unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));

        encounter
            .execute_action(&registry, captain, &ActionRequest::new("Calibrate Weapons"), &mut dice)
            .unwrap();
        assert_eq!(encounter.state.turn_side, Side::Enemy);
        assert_eq!(encounter.ship(ship).unwrap().effects.len(), 2);
    }

    #[test]
    fn test_end_of_round_effects_purged() {
        let (mut encounter, captain, ship, npc) = setup();
        let registry = ActionRegistry::builtin().unwrap();
        let mut dice = ScriptedDice::default();
        encounter
            .execute_action(&registry, captain, &ActionRequest::new("Evasive Action"), &mut dice)
            .unwrap();
        assert_eq!(encounter.ship(ship).unwrap().effects.len(), 1);
        encounter.pass(npc, &mut dice).unwrap();
        let summary = encounter.pass(npc, &mut dice).unwrap().unwrap();
        assert_eq!(summary.effects_expired, 1);
        assert!(encounter.ship(ship).unwrap().effects.is_empty());
    }

    #[test]
    fn test_keep_initiative_costs_threat_and_holds_side() {
        let (mut encounter, _, _, npc) = setup();
        let mut dice = ScriptedDice::default();
        encounter.state.turn_side = Side::Enemy;
        encounter.state.pools.threat = 4;

        encounter.keep_initiative(npc).unwrap();
        assert_eq!(encounter.state.pools.threat, 2);
        encounter.pass(npc, &mut dice).unwrap();
        assert_eq!(encounter.state.turn_side, Side::Enemy);

        let err = encounter.keep_initiative(npc).unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));
    }

    #[test]
    fn test_keep_initiative_needs_a_spare_turn() {
        let (mut encounter, captain, _, _) = setup();
        encounter.state.pools.momentum = 6;
        let err = encounter.keep_initiative(captain).unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));
        assert_eq!(encounter.state.pools.momentum, 6);
    }

    #[test]
    fn test_attack_ends_turn_and_logs() {
        let (mut encounter, captain, _, npc) = setup();
        // Control 9 + Security 0 = TN 9; two hits, assist misses, system roll
        let mut dice = ScriptedDice::new([3, 4, 15, 12]);
        let result = encounter
            .resolve_attack(captain, npc, 0, &AttackOptions::default(), &mut dice)
            .unwrap();
        assert!(result.hit_landed());
        assert_eq!(encounter.state.turn_side, Side::Enemy);
        let attack = encounter
            .state
            .log
            .by_actor(captain)
            .find(|e| matches!(e.event, CombatEventType::Attack { .. }))
            .unwrap();
        assert!(attack.task_result.is_some());
    }

    #[test]
    fn test_cannot_target_hidden_ship() {
        let (mut encounter, captain, _, npc) = setup();
        encounter
            .map
            .as_mut()
            .unwrap()
            .set_terrain(HexCoord::new(1, 0), TerrainType::DenseNebula);
        let mut dice = ScriptedDice::default();
        let err = encounter
            .resolve_attack(captain, npc, 0, &AttackOptions::default(), &mut dice)
            .unwrap_err();
        assert!(matches!(err, CombatError::Precondition(_)));

        encounter.mark_detected(HexCoord::new(1, 0)).unwrap();
        assert!(encounter.is_visible(encounter.participant(captain).unwrap().ship, npc).unwrap());
    }

    #[test]
    fn test_move_pays_momentum_for_terrain() {
        let (mut encounter, captain, ship, _) = setup();
        encounter
            .map
            .as_mut()
            .unwrap()
            .set_terrain(HexCoord::new(0, 0), TerrainType::Nebula);
        let mut dice = ScriptedDice::default();

        let err = encounter
            .move_ship(captain, HexCoord::new(0, 1), MoveMode::Impulse, MoveFunding::Momentum, &mut dice)
            .unwrap_err();
        assert!(matches!(err, CombatError::InsufficientResource { .. }));
        assert_eq!(encounter.ship(ship).unwrap().position, HexCoord::new(0, 0));

        encounter.state.pools.momentum = 2;
        let outcome = encounter
            .move_ship(captain, HexCoord::new(0, 1), MoveMode::Impulse, MoveFunding::Momentum, &mut dice)
            .unwrap();
        assert_eq!(outcome.plan.cost, 1);
        assert_eq!(encounter.state.pools.momentum, 1);
        assert_eq!(encounter.ship(ship).unwrap().position, HexCoord::new(0, 1));
    }

    #[test]
    fn test_corrupt_ship_move_rejected_before_paying() {
        let (mut encounter, captain, ship, _) = setup();
        encounter
            .map
            .as_mut()
            .unwrap()
            .set_terrain(HexCoord::new(0, 0), TerrainType::AsteroidField);
        encounter.ship_mut(ship).unwrap().shields = Shields { current: 30, max: 20 };
        let threat = encounter.state.pools.threat;
        let mut dice = ScriptedDice::default().with_d6([5, 6]);

        let err = encounter
            .move_ship(captain, HexCoord::new(0, 1), MoveMode::Impulse, MoveFunding::Threat, &mut dice)
            .unwrap_err();
        assert!(matches!(err, CombatError::InvariantViolation(_)));
        assert_eq!(encounter.state.pools.threat, threat);
        assert_eq!(encounter.ship(ship).unwrap().position, HexCoord::new(0, 0));
        assert!(encounter.state.claim.is_none());
    }

    #[test]
    fn test_threat_paid_move_through_hazard_rolls_damage() {
        let (mut encounter, captain, ship, _) = setup();
        encounter
            .map
            .as_mut()
            .unwrap()
            .set_terrain(HexCoord::new(0, 0), TerrainType::AsteroidField);
        let mut dice = ScriptedDice::default().with_d6([5, 6]);
        let threat = encounter.state.pools.threat;

        let outcome = encounter
            .move_ship(captain, HexCoord::new(0, 1), MoveMode::Impulse, MoveFunding::Threat, &mut dice)
            .unwrap();
        assert_eq!(encounter.state.pools.threat, threat + 2);
        assert_eq!(outcome.hazards.len(), 1);
        assert_eq!(outcome.hazards[0].total, 2);
        let shields = encounter.ship(ship).unwrap().shields;
        assert!(shields.current < shields.max);
    }

    #[test]
    fn test_thrusters_contact_is_mutual() {
        let (mut encounter, captain, ship, npc) = setup();
        encounter.ship_mut(npc).unwrap().position = HexCoord::new(0, 0);
        let contact = encounter
            .thrusters(captain, ThrustersAction::EnterContact(npc))
            .unwrap();
        assert_eq!(contact, Some(npc));
        assert_eq!(encounter.ship(npc).unwrap().contact, Some(ship));
    }

    #[test]
    fn test_end_scene_drains_momentum() {
        let (mut encounter, _, _, _) = setup();
        encounter.state.pools.momentum = 3;
        encounter.end_scene();
        assert_eq!(encounter.state.pools.momentum, 2);
        encounter.state.pools.momentum = 0;
        encounter.end_scene();
        assert_eq!(encounter.state.pools.momentum, 0);
    }

    #[test]
    fn test_warp_core_explosion_hits_neighbours() {
        let (mut encounter, captain, ship, npc) = setup();
        {
            let raider = encounter.ship_mut(npc).unwrap();
            raider.position = HexCoord::new(0, 0);
            raider.apply_breach(SystemType::Engines);
            raider.apply_breach(SystemType::Comms);
            raider.apply_breach(SystemType::Sensors);
        }
        let mut dice = ScriptedDice::new([20]);
        // NPC is critically damaged and out of the turn order
        let summary = encounter.pass(captain, &mut dice).unwrap().unwrap();

        assert!(summary.warp_checks[0].exploded);
        assert!(encounter.ship(npc).unwrap().destroyed);
        assert_eq!(summary.collateral.len(), 1);
        assert_eq!(summary.collateral[0].0, ship);
        assert_eq!(summary.collateral[0].1.raw_damage, 3);
        assert_eq!(encounter.winner(), Some(Side::Player));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (encounter, _, _, _) = setup();
        let json = encounter.to_json().unwrap();
        let restored = Encounter::from_json(&json).unwrap();
        assert_eq!(restored, encounter);
    }
}
