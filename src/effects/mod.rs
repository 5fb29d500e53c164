//! Active effects: creation, lookup, merge, consumption and expiry

pub mod effect;
pub mod ledger;

pub use effect::{
    ActiveEffect, AppliesTo, EffectDuration, EffectModifiers, EffectSpec, MergedModifiers,
};
pub use ledger::EffectLedger;
