//! Action execution
//!
//! Execution runs in three phases. Everything that can reject the action is
//! checked first, then costs are paid, then dice are rolled and the
//! on-success behaviours applied. An error therefore never leaves partial
//! state behind.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actions::config::{ActionConfig, ActionKind, OnSuccess, RollSpec};
use crate::actions::registry::ActionRegistry;
use crate::core::error::{CombatError, Result};
use crate::core::pools::ResourcePools;
use crate::core::types::{EffectId, Resource, Side};
use crate::crew::{Actor, Discipline};
use crate::dice::DiceSource;
use crate::effects::{ActiveEffect, MergedModifiers};
use crate::ship::{Starship, SystemType};
use crate::task::{
    resolve_task, validate_reroll, BonusDicePurchase, TaskResult, TaskRoll, MAX_COMPLICATION_RANGE,
};

/// Everything an action needs from the encounter
pub struct ActionContext<'a> {
    pub ship: &'a mut Starship,
    pub actor: Actor<'a>,
    pub side: Side,
    pub pools: &'a mut ResourcePools,
    /// Encounter turn sequence, stamped on created effects
    pub turn: u64,
}

/// Player-supplied parameters for one action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub bonus_dice: Option<BonusDicePurchase>,
    /// A focus the actor claims for this task
    #[serde(default)]
    pub focus: Option<String>,
    /// System to patch for Damage Control; defaults to the worst breach
    #[serde(default)]
    pub target_system: Option<SystemType>,
    /// Dice to re-roll, when an effect grants a re-roll
    #[serde(default)]
    pub reroll: Vec<usize>,
    #[serde(default)]
    pub succeed_at_cost: bool,
    #[serde(default)]
    pub optional_roll: bool,
    #[serde(default)]
    pub complication_range: Option<u8>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_bonus_dice(mut self, purchase: BonusDicePurchase) -> Self {
        self.bonus_dice = Some(purchase);
        self
    }

    pub fn targeting(mut self, system: SystemType) -> Self {
        self.target_system = Some(system);
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    pub fn rerolling(mut self, indices: Vec<usize>) -> Self {
        self.reroll = indices;
        self
    }

    pub fn at_cost(mut self) -> Self {
        self.succeed_at_cost = true;
        self
    }
}

/// State changes an action (or attack) caused besides effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    ResourceSpent { resource: Resource, amount: u32 },
    ThreatAdded { amount: u32 },
    MomentumBanked { amount: u32 },
    BreachPatched { system: SystemType, remaining: u32 },
    PowerRestored,
    ReservePowerConsumed,
    ShieldsRegenerated { amount: u32 },
    ReactorStabilized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: String,
    pub task_result: Option<TaskResult>,
    pub effects_created: Vec<EffectId>,
    pub effects_consumed: Vec<EffectId>,
    pub side_effects: Vec<SideEffect>,
}

impl ActionOutcome {
    fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            task_result: None,
            effects_created: Vec::new(),
            effects_consumed: Vec::new(),
            side_effects: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.task_result.as_ref().map_or(true, |r| r.succeeded)
    }
}

/// Probe-pay the action's costs and bonus dice against a copy of the pools
fn price(
    config: &ActionConfig,
    side: Side,
    bonus: Option<&BonusDicePurchase>,
    pools: &ResourcePools,
) -> Result<(ResourcePools, Vec<SideEffect>)> {
    let mut probe = *pools;
    let mut spent = Vec::new();
    let req = &config.requirements;

    if req.momentum_cost > 0 {
        probe.spend_for(side, req.momentum_cost)?;
        spent.push(SideEffect::ResourceSpent {
            resource: side_resource(side),
            amount: req.momentum_cost,
        });
    }
    if req.threat_cost > 0 {
        match side {
            Side::Player => {
                probe.add_threat(req.threat_cost);
                spent.push(SideEffect::ThreatAdded {
                    amount: req.threat_cost,
                });
            }
            Side::Enemy => {
                probe.spend_threat(req.threat_cost)?;
                spent.push(SideEffect::ResourceSpent {
                    resource: Resource::Threat,
                    amount: req.threat_cost,
                });
            }
        }
    }
    if let Some(purchase) = bonus {
        let cost = purchase.pay(&mut probe)?;
        if cost > 0 {
            spent.push(SideEffect::ResourceSpent {
                resource: Resource::BonusDice,
                amount: purchase.count as u32,
            });
        }
    }
    Ok((probe, spent))
}

pub(crate) fn side_resource(side: Side) -> Resource {
    match side {
        Side::Player => Resource::Momentum,
        Side::Enemy => Resource::Threat,
    }
}

fn check_requirements(config: &ActionConfig, ship: &Starship) -> Result<()> {
    if !ship.can_act() {
        return Err(CombatError::Precondition(format!(
            "{} is too badly damaged to act",
            ship.name
        )));
    }
    let req = &config.requirements;
    if req.requires_reserve_power && !ship.reserve_power {
        return Err(CombatError::Precondition(format!(
            "{} requires Reserve Power",
            config.name
        )));
    }
    if req.requires_shields_raised && !ship.shields_raised {
        return Err(CombatError::Precondition(format!(
            "{} requires shields to be raised",
            config.name
        )));
    }
    Ok(())
}

/// Build the task roll for a task-roll action
fn build_roll(
    config: &ActionConfig,
    spec: &RollSpec,
    ctx: &ActionContext<'_>,
    request: &ActionRequest,
    modifiers: &MergedModifiers,
    patch_target: Option<SystemType>,
) -> TaskRoll {
    let mut difficulty = spec.difficulty as i32 + modifiers.difficulty_modifier;
    if let Some(system) = config.system {
        difficulty += ctx.ship.system_breaches(system) as i32;
    }
    if spec.difficulty_scales_with_breach {
        if let Some(system) = patch_target {
            difficulty += ctx.ship.system_breaches(system) as i32;
        }
    }

    let focus = spec.focus_eligible
        && (request.focus.as_deref().is_some_and(|f| ctx.actor.has_focus(f))
            || spec.focuses.iter().any(|f| ctx.actor.has_focus(f)));

    let mut roll = TaskRoll::new(
        ctx.actor.target_number(spec.attribute, spec.discipline),
        difficulty.max(0) as u8,
    )
    .with_discipline(ctx.actor.discipline(spec.discipline))
    .with_focus(focus)
    .with_bonus_dice(request.bonus_dice.map_or(0, |b| b.count))
    .with_complication_range(request.complication_range.unwrap_or(1));

    if spec.optional_roll || request.optional_roll {
        roll = roll.with_optional_roll();
    }
    if let Some(assist) = config.assist {
        roll = roll.with_assist(
            ctx.ship.systems.get(assist.system) + ctx.ship.departments.get(assist.department),
        );
    }
    roll
}

/// True when a system the task relies on is destroyed
fn relies_on_destroyed_system(config: &ActionConfig, ship: &Starship) -> bool {
    config.system.is_some_and(|s| ship.is_system_destroyed(s))
        || config
            .assist
            .is_some_and(|a| ship.is_system_destroyed(a.system))
}

/// Execute a named action for the actor's ship
pub fn execute_action(
    registry: &ActionRegistry,
    ctx: &mut ActionContext<'_>,
    request: &ActionRequest,
    dice: &mut impl DiceSource,
) -> Result<ActionOutcome> {
    let config = registry.get(&request.action)?;

    // === VALIDATE ===
    check_requirements(config, ctx.ship)?;

    let modifiers = ctx.ship.effects.merged(config.category);
    if !request.reroll.is_empty() && !modifiers.can_reroll {
        return Err(CombatError::Precondition(format!(
            "no active effect grants a re-roll for {}",
            config.name
        )));
    }

    if let ActionKind::TaskRoll { .. } = config.kind {
        let range = request.complication_range.unwrap_or(1);
        if !(1..=MAX_COMPLICATION_RANGE).contains(&range) {
            return Err(CombatError::InvalidRoll(format!(
                "complication range {} outside 1..={}",
                range, MAX_COMPLICATION_RANGE
            )));
        }
        let rules = crate::core::config::config();
        let bonus = request.bonus_dice.map_or(0, |b| b.count);
        let dice_count = rules.base_dice.saturating_add(bonus).min(rules.max_dice);
        validate_reroll(&request.reroll, dice_count as usize)?;
    }

    let patch_target = match &config.kind {
        ActionKind::TaskRoll {
            on_success: OnSuccess {
                patch_breach: true, ..
            },
            ..
        } => {
            let target = request.target_system.or_else(|| ctx.ship.worst_breach());
            match target {
                Some(system) if ctx.ship.system_breaches(system) > 0 => Some(system),
                _ => {
                    return Err(CombatError::Precondition(format!(
                        "{} has no breach to patch",
                        ctx.ship.name
                    )))
                }
            }
        }
        _ => None,
    };

    let bonus = match config.kind {
        ActionKind::TaskRoll { .. } => request.bonus_dice.as_ref(),
        _ => None,
    };
    let (paid_pools, spent) = price(config, ctx.side, bonus, ctx.pools)?;

    // === PAY ===
    *ctx.pools = paid_pools;
    let mut outcome = ActionOutcome::new(&config.name);
    outcome.side_effects.extend(spent);

    // === RESOLVE ===
    match &config.kind {
        ActionKind::Pass => {
            debug!(ship = %ctx.ship.name, "Pass");
        }
        ActionKind::Buff { effect } => {
            let created = ActiveEffect::from_spec(ctx.ship.id, &config.name, effect, ctx.turn);
            outcome.effects_created.push(ctx.ship.effects.add(created));
            if config.consumes_reserve_power() {
                ctx.ship.reserve_power = false;
                outcome.side_effects.push(SideEffect::ReservePowerConsumed);
            }
            info!(ship = %ctx.ship.name, action = %config.name, "Buff applied");
        }
        ActionKind::TaskRoll { roll, on_success } => {
            let task = build_roll(config, roll, ctx, request, &modifiers, patch_target);
            let result = if relies_on_destroyed_system(config, ctx.ship) {
                info!(ship = %ctx.ship.name, action = %config.name, "System destroyed, task fails");
                TaskResult::automatic_failure(task.target_number, task.difficulty)
            } else {
                let mut result = resolve_task(dice, &task)?;
                if !request.reroll.is_empty() && result.was_rolled() {
                    result = result.reroll(dice, &request.reroll)?;
                }
                if !result.succeeded && request.succeed_at_cost {
                    result = result.succeed_at_cost()?;
                }
                result
            };

            outcome.effects_consumed = ctx.ship.effects.consume_next_action(config.category);

            if result.succeeded {
                apply_on_success(config, on_success, ctx, &result, patch_target, &mut outcome)?;
            }

            info!(
                ship = %ctx.ship.name,
                action = %config.name,
                succeeded = result.succeeded,
                successes = result.successes,
                "Action resolved"
            );
            outcome.task_result = Some(result);
        }
    }

    Ok(outcome)
}

fn apply_on_success(
    config: &ActionConfig,
    on_success: &OnSuccess,
    ctx: &mut ActionContext<'_>,
    result: &TaskResult,
    patch_target: Option<SystemType>,
    outcome: &mut ActionOutcome,
) -> Result<()> {
    if on_success.generate_momentum && result.momentum_generated > 0 {
        let kept = ctx.pools.bank_for(
            ctx.side,
            result.momentum_generated,
            crate::core::config::config().momentum_cap as u32,
        );
        outcome.side_effects.push(match ctx.side {
            Side::Player => SideEffect::MomentumBanked { amount: kept },
            Side::Enemy => SideEffect::ThreatAdded { amount: kept },
        });
    }

    if on_success.patch_breach {
        if let Some(system) = patch_target {
            let remaining = ctx.ship.patch_breach(system)?;
            outcome
                .side_effects
                .push(SideEffect::BreachPatched { system, remaining });
        }
    }

    if on_success.restore_power && !ctx.ship.reserve_power {
        ctx.ship.reserve_power = true;
        outcome.side_effects.push(SideEffect::PowerRestored);
    }

    if on_success.regenerate_shields {
        let amount = ctx
            .ship
            .shields
            .restore(ctx.actor.discipline(Discipline::Engineering) as u32);
        outcome
            .side_effects
            .push(SideEffect::ShieldsRegenerated { amount });
    }

    if on_success.stabilize_reactor {
        ctx.ship.reactor_stabilized = true;
        outcome.side_effects.push(SideEffect::ReactorStabilized);
    }

    if let Some(effect) = &on_success.create_effect {
        let created = ActiveEffect::from_spec(ctx.ship.id, &config.name, effect, ctx.turn);
        outcome.effects_created.push(ctx.ship.effects.add(created));
    }

    if config.consumes_reserve_power() && ctx.ship.reserve_power {
        ctx.ship.reserve_power = false;
        outcome.side_effects.push(SideEffect::ReservePowerConsumed);
    }

    Ok(())
}
