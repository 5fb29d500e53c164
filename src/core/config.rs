//! Rule configuration with documented constants
//!
//! All tunable rule numbers are collected here. Pool *state* (Momentum,
//! Threat) never lives here; it belongs to each encounter's `CombatState`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{CombatError, Result};

/// Configuration for the combat rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    // === RESOURCE POOLS ===
    /// Maximum shared Momentum. Generation beyond this is discarded.
    pub momentum_cap: u8,

    /// Threat the GM starts an encounter with
    pub starting_threat: u32,

    // === TASKS ===
    /// Base d20s rolled for every task
    pub base_dice: u8,

    /// Hard cap on d20s rolled by the acting character (assist die excluded)
    pub max_dice: u8,

    /// Most bonus dice a single task may buy
    pub max_bonus_dice: u8,

    /// Cost of the 1st, 2nd, 3rd... purchased bonus die
    ///
    /// Costs escalate, so buying three dice costs 1 + 2 + 3 = 6.
    pub bonus_die_costs: Vec<u8>,

    // === MOMENTUM / THREAT SPENDS ===
    /// Cost to keep the initiative (Momentum for players, Threat for the GM)
    pub keep_initiative_cost: u8,

    /// Momentum per +1 damage on a successful attack
    pub added_damage_cost: u8,

    /// Momentum for a Devastating Attack (second half-damage hit)
    pub devastating_attack_cost: u8,

    /// Threat added to the pool whenever a torpedo is fired
    pub torpedo_threat: u8,

    // === MOVEMENT ===
    /// Zones an Impulse move may cross
    pub impulse_range: u32,

    /// Challenge dice rolled per hazardous hex left while paying with Threat
    pub hazard_dice_per_hex: u8,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            momentum_cap: 6,
            starting_threat: 2,

            base_dice: 2,
            max_dice: 5,
            max_bonus_dice: 3,
            bonus_die_costs: vec![1, 2, 3],

            keep_initiative_cost: 2,
            added_damage_cost: 2,
            devastating_attack_cost: 2,
            torpedo_threat: 1,

            impulse_range: 2,
            hazard_dice_per_hex: 2,
        }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Total cost of buying `count` bonus dice
    pub fn bonus_dice_cost(&self, count: u8) -> u32 {
        self.bonus_die_costs
            .iter()
            .take(count as usize)
            .map(|&c| c as u32)
            .sum()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.base_dice == 0 {
            return Err("base_dice must be at least 1".into());
        }

        if self.base_dice > self.max_dice {
            return Err(format!(
                "base_dice ({}) should be <= max_dice ({})",
                self.base_dice, self.max_dice
            ));
        }

        // Every purchasable die needs a price
        if self.bonus_die_costs.len() < self.max_bonus_dice as usize {
            return Err(format!(
                "bonus_die_costs has {} entries but max_bonus_dice is {}",
                self.bonus_die_costs.len(),
                self.max_bonus_dice
            ));
        }

        if self.momentum_cap == 0 {
            return Err("momentum_cap must be positive".into());
        }

        Ok(())
    }
}

/// Load a config from a TOML file, validating it
pub fn load_config(path: &Path) -> Result<CombatConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a config from TOML text, validating it
pub fn parse_config(content: &str) -> Result<CombatConfig> {
    let config: CombatConfig = toml::from_str(content)?;
    config.validate().map_err(CombatError::Config)?;
    Ok(config)
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<CombatConfig> = OnceLock::new();

/// Get the global rules config (initializes with defaults if not set)
pub fn config() -> &'static CombatConfig {
    CONFIG.get_or_init(CombatConfig::default)
}

/// Set the global rules config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: CombatConfig) -> std::result::Result<(), CombatConfig> {
    CONFIG.set(config)
}
