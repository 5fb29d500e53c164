//! Starship stat block and breach accounting

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::core::error::{CombatError, Result};
use crate::core::types::EntityId;
use crate::crew::{CrewQuality, Discipline, Disciplines, Talent};
use crate::effects::EffectLedger;
use crate::ship::systems::{SystemType, Systems};
use crate::ship::weapon::{weapons_damage_bonus, Weapon};
use crate::tactical::HexCoord;

/// Ship departments share the six discipline names
pub type Department = Discipline;
pub type Departments = Disciplines;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shields {
    pub current: u32,
    pub max: u32,
}

impl Shields {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Reduce by `amount`, flooring at 0. Returns the amount absorbed.
    pub fn reduce(&mut self, amount: u32) -> u32 {
        let absorbed = amount.min(self.current);
        self.current -= absorbed;
        absorbed
    }

    pub fn restore(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }
}

/// Coarse damage state, derived from the stat block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageState {
    Nominal,
    Shaken,
    Breached(u32),
    SystemDestroyed(SystemType),
    CriticallyDamaged,
    WarpCoreBreach,
    Destroyed,
}

/// What a single breach did to the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachOutcome {
    pub system: SystemType,
    pub potency: u32,
    pub system_destroyed: bool,
    pub critically_damaged: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starship {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub ship_class: String,
    /// 1-7
    pub scale: u8,
    pub systems: Systems,
    pub departments: Departments,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
    #[serde(default)]
    pub talents: Vec<Talent>,
    /// Breach potency by system
    #[serde(default)]
    pub breaches: BTreeMap<SystemType, u32>,
    pub shields: Shields,
    pub shields_raised: bool,
    pub resistance: u32,
    pub reserve_power: bool,
    /// NPC ships roll with a crew quality instead of a character
    #[serde(default)]
    pub crew_quality: Option<CrewQuality>,
    #[serde(default)]
    pub position: HexCoord,
    #[serde(default)]
    pub contact: Option<EntityId>,
    #[serde(default)]
    pub effects: EffectLedger,
    #[serde(default)]
    pub shaken: bool,
    #[serde(default)]
    pub destroyed: bool,
    /// Skips the next warp core breach check
    #[serde(default)]
    pub reactor_stabilized: bool,
}

impl Starship {
    /// Build a ship with derived shields and resistance
    pub fn new(name: impl Into<String>, scale: u8, systems: Systems, departments: Departments) -> Self {
        let max = systems.structure as u32 + departments.security as u32;
        Self {
            id: EntityId::new(),
            name: name.into(),
            ship_class: String::new(),
            scale,
            systems,
            departments,
            weapons: Vec::new(),
            talents: Vec::new(),
            breaches: BTreeMap::new(),
            shields: Shields::full(max),
            shields_raised: true,
            resistance: scale as u32,
            reserve_power: true,
            crew_quality: None,
            position: HexCoord::default(),
            contact: None,
            effects: EffectLedger::new(),
            shaken: false,
            destroyed: false,
            reactor_stabilized: false,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapons.push(weapon);
        self
    }

    pub fn with_talent(mut self, talent: &str) -> Self {
        let talent = Talent::parse(talent);
        if talent.is("Improved Hull Integrity") {
            self.resistance += 1;
        }
        self.talents.push(talent);
        self
    }

    pub fn with_crew(mut self, quality: CrewQuality) -> Self {
        self.crew_quality = Some(quality);
        self
    }

    pub fn at(mut self, position: HexCoord) -> Self {
        self.position = position;
        self
    }

    pub fn has_talent(&self, name: &str) -> bool {
        self.talents.iter().any(|t| t.is(name))
    }

    pub fn weapons_damage_bonus(&self) -> u32 {
        weapons_damage_bonus(self.systems.weapons)
    }

    /// Shields that actually stand between the hull and an attack
    pub fn effective_shields(&self) -> u32 {
        if self.shields_raised {
            self.shields.current
        } else {
            0
        }
    }

    pub fn system_breaches(&self, system: SystemType) -> u32 {
        self.breaches.get(&system).copied().unwrap_or(0)
    }

    pub fn total_breaches(&self) -> u32 {
        self.breaches.values().sum()
    }

    /// Breaches that destroy a system: half Scale, rounded up
    pub fn destruction_threshold(&self) -> u32 {
        (self.scale as u32 + 1) / 2
    }

    pub fn is_system_destroyed(&self, system: SystemType) -> bool {
        self.system_breaches(system) >= self.destruction_threshold()
    }

    pub fn destroyed_systems(&self) -> Vec<SystemType> {
        SystemType::all()
            .into_iter()
            .filter(|&s| self.is_system_destroyed(s))
            .collect()
    }

    pub fn is_critically_damaged(&self) -> bool {
        self.total_breaches() > self.scale as u32
    }

    pub fn warp_core_at_risk(&self) -> bool {
        !self.destroyed && self.is_critically_damaged() && self.is_system_destroyed(SystemType::Engines)
    }

    /// Critically damaged and destroyed ships take no further actions
    pub fn can_act(&self) -> bool {
        !self.destroyed && !self.is_critically_damaged()
    }

    pub fn damage_state(&self) -> DamageState {
        if self.destroyed {
            return DamageState::Destroyed;
        }
        if self.warp_core_at_risk() {
            return DamageState::WarpCoreBreach;
        }
        if self.is_critically_damaged() {
            return DamageState::CriticallyDamaged;
        }
        if let Some(&system) = self.destroyed_systems().first() {
            return DamageState::SystemDestroyed(system);
        }
        match self.total_breaches() {
            0 if self.shaken => DamageState::Shaken,
            0 => DamageState::Nominal,
            n => DamageState::Breached(n),
        }
    }

    /// Record one breach on `system`
    pub fn apply_breach(&mut self, system: SystemType) -> BreachOutcome {
        let was_destroyed = self.is_system_destroyed(system);
        let was_critical = self.is_critically_damaged();

        let potency = {
            let entry = self.breaches.entry(system).or_insert(0);
            *entry += 1;
            *entry
        };

        let system_destroyed = !was_destroyed && self.is_system_destroyed(system);
        let critically_damaged = !was_critical && self.is_critically_damaged();
        if was_critical && self.total_breaches() > self.scale as u32 + 1 && !self.destroyed {
            self.destroyed = true;
            info!(ship = %self.name, "Ship destroyed");
        }

        info!(ship = %self.name, %system, potency, "Breach");
        if system_destroyed {
            info!(ship = %self.name, %system, "System destroyed");
        }
        if critically_damaged {
            info!(ship = %self.name, breaches = self.total_breaches(), "Critically damaged");
        }

        BreachOutcome {
            system,
            potency,
            system_destroyed,
            critically_damaged,
            destroyed: self.destroyed,
        }
    }

    /// Reduce a breach's potency by one
    pub fn patch_breach(&mut self, system: SystemType) -> Result<u32> {
        let Some(potency) = self.breaches.get_mut(&system) else {
            return Err(CombatError::Precondition(format!(
                "{} has no breach on {}",
                self.name, system
            )));
        };
        *potency -= 1;
        let left = *potency;
        if left == 0 {
            self.breaches.remove(&system);
        }
        info!(ship = %self.name, %system, remaining = left, "Breach patched");
        Ok(left)
    }

    /// The system with the worst breach, ties to the first in table order
    pub fn worst_breach(&self) -> Option<SystemType> {
        self.breaches
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(&s, _)| s)
    }

    /// Turns per round for an NPC ship
    pub fn turns_per_round(&self) -> u32 {
        self.scale.max(1) as u32
    }

    /// Check the stat block against the data-model invariants
    pub fn check_invariants(&self) -> Result<()> {
        if self.shields.current > self.shields.max {
            return Err(CombatError::InvariantViolation(format!(
                "{} shields {} exceed max {}",
                self.name, self.shields.current, self.shields.max
            )));
        }
        if !(1..=7).contains(&self.scale) {
            return Err(CombatError::InvariantViolation(format!(
                "{} has scale {}",
                self.name, self.scale
            )));
        }
        if self.breaches.values().any(|&p| p == 0) {
            return Err(CombatError::InvariantViolation(format!(
                "{} has a zero-potency breach",
                self.name
            )));
        }
        Ok(())
    }
}
