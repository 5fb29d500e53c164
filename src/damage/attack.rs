//! Weapon attacks
//!
//! An attack rolls Control + Security against the weapon's difficulty,
//! assisted by the ship's Weapons + Security, then hands the damage to the
//! hit pipeline. Validation and pricing happen before any die is rolled.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actions::engine::side_resource;
use crate::actions::SideEffect;
use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::core::pools::ResourcePools;
use crate::core::types::{EffectId, Resource, Side};
use crate::crew::{Actor, Attribute, Discipline};
use crate::damage::hit::{apply_hit, Hit, HitReport};
use crate::dice::DiceSource;
use crate::effects::AppliesTo;
use crate::ship::{DamageState, Starship, SystemType, WeaponQuality, WeaponType};
use crate::task::{
    resolve_task, validate_reroll, BonusDicePurchase, TaskResult, TaskRoll, MAX_COMPLICATION_RANGE,
};

pub struct AttackContext<'a> {
    pub attacker: &'a mut Starship,
    pub defender: &'a mut Starship,
    pub actor: Actor<'a>,
    pub side: Side,
    pub pools: &'a mut ResourcePools,
}

/// Choices the attacking player makes before rolling
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackOptions {
    #[serde(default)]
    pub bonus_dice: Option<BonusDicePurchase>,
    #[serde(default)]
    pub focus: Option<String>,
    /// Points of Added Damage bought on success
    #[serde(default)]
    pub added_damage: u32,
    #[serde(default)]
    pub devastating: bool,
    #[serde(default)]
    pub succeed_at_cost: bool,
    #[serde(default)]
    pub reroll: Vec<usize>,
    /// Only honoured while a system-choice effect is active
    #[serde(default)]
    pub target_system: Option<SystemType>,
    #[serde(default)]
    pub complication_range: Option<u8>,
}

impl AttackOptions {
    pub fn with_added_damage(mut self, points: u32) -> Self {
        self.added_damage = points;
        self
    }

    pub fn devastating(mut self) -> Self {
        self.devastating = true;
        self
    }

    pub fn targeting(mut self, system: SystemType) -> Self {
        self.target_system = Some(system);
        self
    }

    pub fn with_bonus_dice(mut self, purchase: BonusDicePurchase) -> Self {
        self.bonus_dice = Some(purchase);
        self
    }

    pub fn rerolling(mut self, indices: Vec<usize>) -> Self {
        self.reroll = indices;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub weapon: String,
    pub task_result: TaskResult,
    /// Damage before resistance, including Added Damage
    pub base_damage: u32,
    pub hit: Option<HitReport>,
    pub devastating_hit: Option<HitReport>,
    pub effects_consumed: Vec<EffectId>,
    pub side_effects: Vec<SideEffect>,
    pub defender_state: DamageState,
}

impl DamageResult {
    pub fn hit_landed(&self) -> bool {
        self.hit.is_some()
    }

    pub fn breaches_inflicted(&self) -> usize {
        self.hit.iter().chain(&self.devastating_hit).filter(|h| h.breach.is_some()).count()
    }
}

fn precondition(message: String) -> CombatError {
    CombatError::Precondition(message)
}

/// Resolve an attack with the attacker's weapon at `weapon_index`
pub fn resolve_attack(
    ctx: &mut AttackContext<'_>,
    weapon_index: usize,
    options: &AttackOptions,
    dice: &mut impl DiceSource,
) -> Result<DamageResult> {
    let rules = config();

    // === VALIDATE ===
    ctx.attacker.check_invariants()?;
    ctx.defender.check_invariants()?;
    let weapon = ctx.attacker.weapons.get(weapon_index).cloned().ok_or_else(|| {
        precondition(format!("{} has no weapon #{}", ctx.attacker.name, weapon_index))
    })?;
    if !ctx.attacker.can_act() {
        return Err(precondition(format!(
            "{} is too badly damaged to act",
            ctx.attacker.name
        )));
    }
    if ctx.defender.destroyed {
        return Err(precondition(format!("{} is already destroyed", ctx.defender.name)));
    }
    if ctx.attacker.id == ctx.defender.id {
        return Err(precondition(format!("{} cannot target itself", ctx.attacker.name)));
    }

    let distance = ctx.attacker.position.distance(&ctx.defender.position);
    if !weapon.range.reaches(distance) {
        return Err(precondition(format!(
            "{} is out of range of {} ({} zones)",
            ctx.defender.name, weapon.name, distance
        )));
    }

    let attack_mods = ctx.attacker.effects.merged(AppliesTo::Attack);
    let defense_mods = ctx.defender.effects.merged_incoming();
    if !options.reroll.is_empty() && !attack_mods.can_reroll {
        return Err(precondition("no active effect grants a re-roll".to_string()));
    }
    if options.target_system.is_some() && !attack_mods.can_choose_system {
        return Err(precondition(
            "no active effect allows choosing the system hit".to_string(),
        ));
    }

    let complication_range = options.complication_range.unwrap_or(1);
    if !(1..=MAX_COMPLICATION_RANGE).contains(&complication_range) {
        return Err(CombatError::InvalidRoll(format!(
            "complication range {} outside 1..={}",
            complication_range, MAX_COMPLICATION_RANGE
        )));
    }
    let bonus = options.bonus_dice.map_or(0, |b| b.count);
    let dice_count = rules.base_dice.saturating_add(bonus).min(rules.max_dice);
    validate_reroll(&options.reroll, dice_count as usize)?;

    let momentum_spend = options.added_damage * rules.added_damage_cost as u32
        + if options.devastating {
            rules.devastating_attack_cost as u32
        } else {
            0
        };

    let mut paid = *ctx.pools;
    let bonus_cost = match &options.bonus_dice {
        Some(purchase) => purchase.pay(&mut paid)?,
        None => 0,
    };
    paid.can_afford(ctx.side, momentum_spend)?;

    // === PAY ===
    *ctx.pools = paid;
    let mut side_effects = Vec::new();
    if bonus_cost > 0 {
        side_effects.push(SideEffect::ResourceSpent {
            resource: Resource::BonusDice,
            amount: bonus as u32,
        });
    }

    // === RESOLVE ===
    let target_number = ctx.actor.target_number(Attribute::Control, Discipline::Security);
    let mut difficulty = weapon.attack_difficulty() as i32
        + ctx.attacker.system_breaches(SystemType::Weapons) as i32
        + attack_mods.difficulty_modifier
        + ctx.attacker.effects.merged_incoming().attack_penalty
        + defense_mods.difficulty_modifier;
    difficulty = difficulty.max(0);

    let task_result = if ctx.attacker.is_system_destroyed(SystemType::Weapons) {
        info!(ship = %ctx.attacker.name, "Weapons destroyed, attack fails");
        TaskResult::automatic_failure(target_number, difficulty as u8)
    } else {
        let focus = options
            .focus
            .as_deref()
            .is_some_and(|f| ctx.actor.has_focus(f));
        let roll = TaskRoll::new(target_number, difficulty as u8)
            .with_discipline(ctx.actor.discipline(Discipline::Security))
            .with_focus(focus)
            .with_bonus_dice(bonus)
            .with_complication_range(complication_range)
            .with_assist(ctx.attacker.systems.weapons + ctx.attacker.departments.security);
        let mut result = resolve_task(dice, &roll)?;
        if !options.reroll.is_empty() && result.was_rolled() {
            result = result.reroll(dice, &options.reroll)?;
        }
        if !result.succeeded && options.succeed_at_cost {
            result = result.succeed_at_cost()?;
        }
        result
    };

    if weapon.weapon_type == WeaponType::Torpedo && ctx.side == Side::Player {
        let threat = rules.torpedo_threat as u32;
        ctx.pools.add_threat(threat);
        side_effects.push(SideEffect::ThreatAdded { amount: threat });
    }

    let mut effects_consumed = ctx.attacker.effects.consume_next_action(AppliesTo::Attack);
    effects_consumed.extend(ctx.defender.effects.consume_incoming());

    // No Momentum may be spent on a success bought at cost
    let at_cost = task_result.succeeded_at_cost;
    let added_damage = if at_cost { 0 } else { options.added_damage };
    let devastating = options.devastating && !at_cost;
    let momentum_spend = if at_cost { 0 } else { momentum_spend };

    let base_damage = (weapon.damage as i32
        + ctx.attacker.weapons_damage_bonus() as i32
        + weapon.quality_damage_bonus() as i32
        + attack_mods.damage_bonus
        + added_damage as i32)
        .max(0) as u32;

    let mut result = DamageResult {
        weapon: weapon.name.clone(),
        task_result,
        base_damage,
        hit: None,
        devastating_hit: None,
        effects_consumed,
        side_effects,
        defender_state: ctx.defender.damage_state(),
    };

    if !result.task_result.succeeded {
        info!(
            attacker = %ctx.attacker.name,
            defender = %ctx.defender.name,
            weapon = %weapon.name,
            "Attack missed"
        );
        return Ok(result);
    }

    let generated = result.task_result.momentum_generated;
    if generated > 0 {
        let kept = ctx.pools.bank_for(ctx.side, generated, rules.momentum_cap as u32);
        result.side_effects.push(match ctx.side {
            Side::Player => SideEffect::MomentumBanked { amount: kept },
            Side::Enemy => SideEffect::ThreatAdded { amount: kept },
        });
    }
    if momentum_spend > 0 {
        ctx.pools.spend_for(ctx.side, momentum_spend)?;
        result.side_effects.push(SideEffect::ResourceSpent {
            resource: side_resource(ctx.side),
            amount: momentum_spend,
        });
    }

    let hit = Hit {
        damage: base_damage,
        piercing: attack_mods.piercing || weapon.has(WeaponQuality::Piercing),
        complications: result.task_result.complications,
        depleting: weapon.has(WeaponQuality::Depleting),
        resistance_bonus: defense_mods.resistance_bonus,
        chosen_system: options.target_system,
    };
    debug!(?hit, "Attack hit");
    result.hit = Some(apply_hit(ctx.defender, &hit, dice)?);

    if devastating && !ctx.defender.destroyed {
        let second = Hit {
            damage: (base_damage + 1) / 2,
            chosen_system: None,
            ..hit
        };
        result.devastating_hit = Some(apply_hit(ctx.defender, &second, dice)?);
    }

    result.defender_state = ctx.defender.damage_state();
    info!(
        attacker = %ctx.attacker.name,
        defender = %ctx.defender.name,
        weapon = %weapon.name,
        damage = base_damage,
        state = ?result.defender_state,
        "Attack hit"
    );
    Ok(result)
}
