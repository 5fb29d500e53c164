//! Declarative action definitions
//!
//! The table is written in TOML as loosely-shaped entries and converted once
//! into the typed `ActionConfig`, so an entry is either a buff, a task roll,
//! or a pass and never a mix.

use serde::{Deserialize, Serialize};

use crate::core::error::CombatError;
use crate::crew::{Attribute, Discipline};
use crate::effects::{AppliesTo, EffectSpec};
use crate::ship::{Department, SystemType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSlot {
    #[default]
    Major,
    Minor,
}

/// How a task-roll action is rolled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSpec {
    pub attribute: Attribute,
    pub discipline: Discipline,
    pub difficulty: u8,
    #[serde(default)]
    pub focus_eligible: bool,
    /// Focuses that apply automatically when the actor has one of them
    #[serde(default)]
    pub focuses: Vec<String>,
    /// Difficulty grows by the targeted system's breach potency
    #[serde(default)]
    pub difficulty_scales_with_breach: bool,
    /// Roll even at Difficulty 0
    #[serde(default)]
    pub optional_roll: bool,
}

/// What a successful task roll does. Every flag set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OnSuccess {
    pub generate_momentum: bool,
    pub patch_breach: bool,
    pub restore_power: bool,
    pub create_effect: Option<EffectSpec>,
    pub regenerate_shields: bool,
    pub stabilize_reactor: bool,
}

/// Gates and costs checked before anything is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub requires_reserve_power: bool,
    pub requires_shields_raised: bool,
    /// Paid from the acting side's pool (Threat for the GM)
    pub momentum_cost: u32,
    /// Added to Threat by players, spent from Threat by the GM
    pub threat_cost: u32,
}

/// Ship system and department lending one extra die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipAssist {
    pub system: SystemType,
    pub department: Department,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// No roll; the effect is created immediately
    Buff { effect: EffectSpec },
    TaskRoll { roll: RollSpec, on_success: OnSuccess },
    /// Ends the turn without acting
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionConfig {
    pub name: String,
    pub slot: ActionSlot,
    pub category: AppliesTo,
    /// System the action relies on; its breaches add Difficulty
    pub system: Option<SystemType>,
    pub assist: Option<ShipAssist>,
    pub requirements: Requirements,
    pub kind: ActionKind,
    pub description: String,
}

impl ActionConfig {
    pub fn is_buff(&self) -> bool {
        matches!(self.kind, ActionKind::Buff { .. })
    }

    pub fn is_task_roll(&self) -> bool {
        matches!(self.kind, ActionKind::TaskRoll { .. })
    }

    /// Reserve Power is spent unless the action is what restores it
    pub fn consumes_reserve_power(&self) -> bool {
        let restores = matches!(
            self.kind,
            ActionKind::TaskRoll {
                on_success: OnSuccess {
                    restore_power: true,
                    ..
                },
                ..
            }
        );
        self.requirements.requires_reserve_power && !restores
    }
}

/// An action as written in the TOML table
#[derive(Debug, Clone, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    #[serde(default)]
    pub slot: ActionSlot,
    #[serde(default)]
    pub category: AppliesTo,
    #[serde(default)]
    pub system: Option<SystemType>,
    #[serde(default)]
    pub assist: Option<ShipAssist>,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub buff: Option<EffectSpec>,
    #[serde(default)]
    pub roll: Option<RollSpec>,
    #[serde(default)]
    pub on_success: Option<OnSuccess>,
    #[serde(default)]
    pub pass: bool,
    #[serde(default)]
    pub description: String,
}

impl TryFrom<ActionEntry> for ActionConfig {
    type Error = CombatError;

    fn try_from(entry: ActionEntry) -> Result<Self, Self::Error> {
        let kind = match (entry.buff, entry.roll, entry.pass) {
            (Some(effect), None, false) => {
                if entry.on_success.is_some() {
                    return Err(CombatError::Config(format!(
                        "{}: buff actions have no on_success",
                        entry.name
                    )));
                }
                ActionKind::Buff { effect }
            }
            (None, Some(roll), false) => ActionKind::TaskRoll {
                roll,
                on_success: entry.on_success.unwrap_or_default(),
            },
            (None, None, true) => ActionKind::Pass,
            _ => {
                return Err(CombatError::Config(format!(
                    "{}: exactly one of buff, roll or pass is required",
                    entry.name
                )))
            }
        };

        Ok(ActionConfig {
            name: entry.name,
            slot: entry.slot,
            category: entry.category,
            system: entry.system,
            assist: entry.assist,
            requirements: entry.requirements,
            kind,
            description: entry.description,
        })
    }
}
