//! Active effects (buffs) and their modifiers

use serde::{Deserialize, Serialize};

use crate::core::types::{EffectId, EntityId};

/// Which kind of action an effect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    Attack,
    Defense,
    Sensor,
    Movement,
    #[default]
    All,
}

impl AppliesTo {
    /// An `All` effect matches every category; `All` as the category being
    /// resolved matches only `All` effects.
    pub fn matches(&self, category: AppliesTo) -> bool {
        *self == AppliesTo::All || *self == category
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDuration {
    /// Consumed by the next qualifying action, whatever its outcome
    NextAction,
    /// Purged when the current turn completes
    EndOfTurn,
    /// Survives the turn it was created in; purged when the next turn completes
    UntilNextTurn,
    /// Purged when the round ends
    EndOfRound,
}

/// Sparse modifier set. Only present keys apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_modifier: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_reroll: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_choose_system: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piercing: Option<bool>,
    /// Extra Difficulty on the owner's own attacks while the effect guards it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_penalty: Option<i32>,
}

impl EffectModifiers {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Template for an effect, as written in the action table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub applies_to: AppliesTo,
    pub duration: EffectDuration,
    #[serde(flatten)]
    pub modifiers: EffectModifiers,
}

/// An effect currently buffing one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub id: EffectId,
    pub owner: EntityId,
    pub source_action: String,
    pub applies_to: AppliesTo,
    pub duration: EffectDuration,
    pub modifiers: EffectModifiers,
    /// Encounter turn sequence number when created
    pub created_turn: u64,
}

impl ActiveEffect {
    pub fn from_spec(owner: EntityId, source_action: &str, spec: &EffectSpec, turn: u64) -> Self {
        Self {
            id: EffectId::new(),
            owner,
            source_action: source_action.to_string(),
            applies_to: spec.applies_to,
            duration: spec.duration,
            modifiers: spec.modifiers,
            created_turn: turn,
        }
    }
}

/// All matching modifiers folded together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedModifiers {
    pub damage_bonus: i32,
    pub resistance_bonus: i32,
    pub difficulty_modifier: i32,
    pub can_reroll: bool,
    pub can_choose_system: bool,
    pub piercing: bool,
    pub attack_penalty: i32,
    /// Effects that contributed
    pub sources: Vec<EffectId>,
}

impl MergedModifiers {
    pub fn absorb(&mut self, effect: &ActiveEffect) {
        let m = &effect.modifiers;
        self.damage_bonus += m.damage_bonus.unwrap_or(0);
        self.resistance_bonus += m.resistance_bonus.unwrap_or(0);
        self.difficulty_modifier += m.difficulty_modifier.unwrap_or(0);
        self.can_reroll |= m.can_reroll.unwrap_or(false);
        self.can_choose_system |= m.can_choose_system.unwrap_or(false);
        self.piercing |= m.piercing.unwrap_or(false);
        self.attack_penalty += m.attack_penalty.unwrap_or(0);
        self.sources.push(effect.id);
    }
}
