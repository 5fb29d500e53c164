//! The list of effects owned by one entity

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::EffectId;
use crate::effects::effect::{ActiveEffect, AppliesTo, EffectDuration, MergedModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectLedger {
    effects: Vec<ActiveEffect>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: ActiveEffect) -> EffectId {
        let id = effect.id;
        debug!(source = %effect.source_action, applies_to = ?effect.applies_to, "Effect created");
        self.effects.push(effect);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn matching(&self, category: AppliesTo) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter().filter(move |e| e.applies_to.matches(category))
    }

    /// Merge every effect matching `category`
    pub fn merged(&self, category: AppliesTo) -> MergedModifiers {
        let mut merged = MergedModifiers::default();
        for effect in self.matching(category) {
            merged.absorb(effect);
        }
        merged
    }

    /// Effects that protect the owner against incoming attacks. A next_action
    /// effect must target defense explicitly; an `All` one belongs to the
    /// owner's own next action.
    fn guards(effect: &ActiveEffect) -> bool {
        effect.applies_to == AppliesTo::Defense
            || (effect.applies_to == AppliesTo::All && effect.duration != EffectDuration::NextAction)
    }

    pub fn merged_incoming(&self) -> MergedModifiers {
        let mut merged = MergedModifiers::default();
        for effect in self.effects.iter().filter(|e| Self::guards(e)) {
            merged.absorb(effect);
        }
        merged
    }

    /// Remove next_action defense effects once an attack against the owner resolves
    pub fn consume_incoming(&mut self) -> Vec<EffectId> {
        let mut consumed = Vec::new();
        self.effects.retain(|e| {
            let used = e.duration == EffectDuration::NextAction && e.applies_to == AppliesTo::Defense;
            if used {
                consumed.push(e.id);
            }
            !used
        });
        consumed
    }

    /// Remove the next_action effects that apply to `category`.
    /// Called once a qualifying action has resolved.
    pub fn consume_next_action(&mut self, category: AppliesTo) -> Vec<EffectId> {
        let mut consumed = Vec::new();
        self.effects.retain(|e| {
            let used = e.duration == EffectDuration::NextAction && e.applies_to.matches(category);
            if used {
                consumed.push(e.id);
            }
            !used
        });
        if !consumed.is_empty() {
            debug!(count = consumed.len(), ?category, "Next-action effects consumed");
        }
        consumed
    }

    /// Drop every end_of_turn effect, plus until_next_turn effects created
    /// before the turn that just completed
    pub fn purge_end_of_turn(&mut self, completed_turn: u64) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| match e.duration {
            EffectDuration::EndOfTurn => false,
            EffectDuration::UntilNextTurn => e.created_turn >= completed_turn,
            _ => true,
        });
        before - self.effects.len()
    }

    pub fn purge_end_of_round(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.duration != EffectDuration::EndOfRound);
        before - self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EntityId;
    use crate::effects::effect::{EffectModifiers, EffectSpec};

    fn spec(applies_to: AppliesTo, duration: EffectDuration, damage: i32) -> EffectSpec {
        EffectSpec {
            applies_to,
            duration,
            modifiers: EffectModifiers {
                damage_bonus: Some(damage),
                ..EffectModifiers::default()
            },
        }
    }

    fn ledger_with(specs: &[EffectSpec], turn: u64) -> EffectLedger {
        let owner = EntityId::new();
        let mut ledger = EffectLedger::new();
        for s in specs {
            ledger.add(ActiveEffect::from_spec(owner, "Test", s, turn));
        }
        ledger
    }

    #[test]
    fn test_merge_is_additive_and_filtered() {
        let ledger = ledger_with(
            &[
                spec(AppliesTo::Attack, EffectDuration::NextAction, 1),
                spec(AppliesTo::All, EffectDuration::EndOfRound, 2),
                spec(AppliesTo::Defense, EffectDuration::EndOfRound, 5),
            ],
            1,
        );
        let merged = ledger.merged(AppliesTo::Attack);
        assert_eq!(merged.damage_bonus, 3);
        assert_eq!(merged.sources.len(), 2);
    }

    #[test]
    fn test_consume_only_matching_next_action() {
        let mut ledger = ledger_with(
            &[
                spec(AppliesTo::Attack, EffectDuration::NextAction, 1),
                spec(AppliesTo::Sensor, EffectDuration::NextAction, 1),
                spec(AppliesTo::Attack, EffectDuration::EndOfRound, 1),
            ],
            1,
        );
        assert_eq!(ledger.consume_next_action(AppliesTo::Attack).len(), 1);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.consume_next_action(AppliesTo::Attack).is_empty());
    }

    #[test]
    fn test_end_of_turn_purged_when_its_turn_completes() {
        let mut ledger = ledger_with(&[spec(AppliesTo::Defense, EffectDuration::EndOfTurn, 0)], 3);
        assert_eq!(ledger.purge_end_of_turn(3), 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_until_next_turn_outlives_its_own_turn() {
        let mut ledger = ledger_with(
            &[
                spec(AppliesTo::Defense, EffectDuration::UntilNextTurn, 0),
                spec(AppliesTo::Attack, EffectDuration::EndOfTurn, 0),
            ],
            3,
        );
        assert_eq!(ledger.purge_end_of_turn(3), 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.purge_end_of_turn(4), 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_purge_end_of_turn_idempotent() {
        let mut ledger = ledger_with(
            &[
                spec(AppliesTo::Defense, EffectDuration::EndOfTurn, 0),
                spec(AppliesTo::Attack, EffectDuration::EndOfRound, 0),
            ],
            1,
        );
        ledger.purge_end_of_turn(2);
        let after_first = ledger.clone();
        ledger.purge_end_of_turn(2);
        assert_eq!(ledger, after_first);
    }

    #[test]
    fn test_incoming_ignores_own_next_action() {
        let mut ledger = ledger_with(
            &[
                spec(AppliesTo::All, EffectDuration::NextAction, 1),
                spec(AppliesTo::All, EffectDuration::EndOfRound, 2),
                spec(AppliesTo::Defense, EffectDuration::NextAction, 4),
            ],
            1,
        );
        assert_eq!(ledger.merged_incoming().damage_bonus, 6);
        assert_eq!(ledger.consume_incoming().len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_purge_end_of_round() {
        let mut ledger = ledger_with(
            &[
                spec(AppliesTo::All, EffectDuration::EndOfRound, 0),
                spec(AppliesTo::Attack, EffectDuration::NextAction, 0),
            ],
            1,
        );
        assert_eq!(ledger.purge_end_of_round(), 1);
        assert_eq!(ledger.len(), 1);
    }
}
