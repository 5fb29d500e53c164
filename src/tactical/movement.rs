//! Move validation and costing
//!
//! Impulse crosses up to two zones; each hex left costs its terrain's
//! Momentum, so the starting hex counts and the destination does not.
//! Thrusters stay inside the current zone and are always free.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::debug;

use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::core::types::{EntityId, Resource};
use crate::ship::RangeClass;
use crate::tactical::hex::HexCoord;
use crate::tactical::map::TacticalMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    Impulse,
    Thrusters,
}

/// What the mover pays with, and how much of it is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePayment {
    Momentum(u32),
    /// The GM pays from the Threat pool
    SpendThreat(u32),
    /// A player pays by adding to the Threat pool
    AddThreat,
}

impl MovePayment {
    pub fn is_threat(&self) -> bool {
        !matches!(self, MovePayment::Momentum(_))
    }

    fn check(&self, cost: u32) -> Result<()> {
        let (resource, available) = match *self {
            MovePayment::Momentum(available) => (Resource::Momentum, available),
            MovePayment::SpendThreat(available) => (Resource::Threat, available),
            MovePayment::AddThreat => return Ok(()),
        };
        if cost > available {
            return Err(CombatError::InsufficientResource {
                resource,
                needed: cost,
                available,
            });
        }
        Ok(())
    }
}

/// A legal, costed move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    pub mode: MoveMode,
    pub from: HexCoord,
    pub to: HexCoord,
    /// Includes both ends
    pub path: Vec<HexCoord>,
    pub cost: u32,
    /// Hazardous hexes left while paying with Threat
    pub hazard_hexes: Vec<HexCoord>,
    /// Challenge dice owed for the hazards
    pub hazard_dice: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchNode {
    coord: HexCoord,
    steps: u32,
    cost: u32,
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; fewer steps breaks ties
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.steps.cmp(&self.steps))
            .then_with(|| self.coord.cmp(&other.coord))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cheapest way to reach every hex within `max_steps`, as (cost, path)
pub fn reachable(
    map: &TacticalMap,
    start: HexCoord,
    max_steps: u32,
) -> HashMap<HexCoord, (u32, Vec<HexCoord>)> {
    let mut best: HashMap<(HexCoord, u32), u32> = HashMap::new();
    let mut came_from: HashMap<(HexCoord, u32), (HexCoord, u32)> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut result: HashMap<HexCoord, (u32, (HexCoord, u32))> = HashMap::new();

    best.insert((start, 0), 0);
    open.push(SearchNode {
        coord: start,
        steps: 0,
        cost: 0,
    });

    while let Some(node) = open.pop() {
        let key = (node.coord, node.steps);
        if best.get(&key).is_some_and(|&c| c < node.cost) {
            continue;
        }
        result.entry(node.coord).or_insert((node.cost, key));

        if node.steps == max_steps {
            continue;
        }
        let leave_cost = map.terrain_at(node.coord).movement_cost();
        for next in node.coord.neighbors() {
            if !map.in_bounds(next) {
                continue;
            }
            let next_key = (next, node.steps + 1);
            let cost = node.cost + leave_cost;
            if best.get(&next_key).map_or(true, |&c| cost < c) {
                best.insert(next_key, cost);
                came_from.insert(next_key, key);
                open.push(SearchNode {
                    coord: next,
                    steps: node.steps + 1,
                    cost,
                });
            }
        }
    }

    result
        .into_iter()
        .map(|(coord, (cost, key))| (coord, (cost, reconstruct(&came_from, key))))
        .collect()
}

fn reconstruct(
    came_from: &HashMap<(HexCoord, u32), (HexCoord, u32)>,
    mut current: (HexCoord, u32),
) -> Vec<HexCoord> {
    let mut path = vec![current.0];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev.0);
        current = prev;
    }
    path.reverse();
    path
}

/// Validate and cost a move. Insufficient resources block the move.
pub fn validate_move(
    from: HexCoord,
    to: HexCoord,
    map: &TacticalMap,
    mode: MoveMode,
    payment: MovePayment,
) -> Result<MovePlan> {
    if !map.in_bounds(to) {
        return Err(CombatError::Precondition(format!(
            "destination {} is off the map",
            to
        )));
    }

    match mode {
        MoveMode::Thrusters => {
            if from != to {
                return Err(CombatError::Precondition(
                    "thrusters cannot leave the current zone".into(),
                ));
            }
            Ok(MovePlan {
                mode,
                from,
                to,
                path: vec![from],
                cost: 0,
                hazard_hexes: Vec::new(),
                hazard_dice: 0,
            })
        }
        MoveMode::Impulse => {
            let range = config().impulse_range;
            if from.distance(&to) > range {
                return Err(CombatError::Precondition(format!(
                    "{} is beyond impulse range ({} zones)",
                    to, range
                )));
            }

            let mut routes = reachable(map, from, range);
            let (cost, path) = routes.remove(&to).ok_or_else(|| {
                CombatError::Precondition(format!("no route from {} to {}", from, to))
            })?;
            payment.check(cost)?;

            let hazard_hexes: Vec<HexCoord> = if payment.is_threat() {
                path[..path.len().saturating_sub(1)]
                    .iter()
                    .copied()
                    .filter(|&h| map.terrain_at(h).is_hazardous())
                    .collect()
            } else {
                Vec::new()
            };
            let hazard_dice = hazard_hexes.len() as u32 * config().hazard_dice_per_hex as u32;

            debug!(%from, %to, cost, hazard_dice, "Impulse move validated");

            Ok(MovePlan {
                mode,
                from,
                to,
                path,
                cost,
                hazard_hexes,
                hazard_dice,
            })
        }
    }
}

/// Range band between two positions
pub fn range_category(from: HexCoord, to: HexCoord) -> RangeClass {
    RangeClass::from_distance(from.distance(&to))
}

/// Thrusters maneuvers within a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrustersAction {
    EnterContact(EntityId),
    ExitContact(EntityId),
}

/// Apply a thrusters maneuver; returns the new contact state
pub fn resolve_thrusters(
    action: ThrustersAction,
    current_contact: Option<EntityId>,
    ships_in_hex: &[EntityId],
) -> Result<Option<EntityId>> {
    match action {
        ThrustersAction::EnterContact(target) => {
            if let Some(existing) = current_contact {
                return Err(CombatError::Precondition(format!(
                    "already in contact with {}",
                    existing
                )));
            }
            if !ships_in_hex.contains(&target) {
                return Err(CombatError::Precondition(
                    "contact requires a ship in the same zone".into(),
                ));
            }
            Ok(Some(target))
        }
        ThrustersAction::ExitContact(target) => {
            if current_contact != Some(target) {
                return Err(CombatError::Precondition(format!(
                    "not in contact with {}",
                    target
                )));
            }
            Ok(None)
        }
    }
}
