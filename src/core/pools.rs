//! Momentum and Threat pools
//!
//! Owned by each encounter's `CombatState` and passed by reference into every
//! resolution call. Nothing here is process-global.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{CombatError, Result};
use crate::core::types::{Resource, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePools {
    /// Shared player pool, never above the configured cap
    pub momentum: u32,
    /// GM pool, unbounded
    pub threat: u32,
}

impl ResourcePools {
    pub fn new(momentum: u32, threat: u32) -> Self {
        Self { momentum, threat }
    }

    /// Add Momentum, discarding anything above `cap`. Returns the amount kept.
    pub fn add_momentum(&mut self, amount: u32, cap: u32) -> u32 {
        let before = self.momentum;
        self.momentum = (self.momentum + amount).min(cap.max(before));
        let kept = self.momentum - before;
        if kept < amount {
            debug!(discarded = amount - kept, "Momentum over cap discarded");
        }
        kept
    }

    pub fn spend_momentum(&mut self, amount: u32) -> Result<()> {
        if amount > self.momentum {
            return Err(CombatError::InsufficientResource {
                resource: Resource::Momentum,
                needed: amount,
                available: self.momentum,
            });
        }
        self.momentum -= amount;
        Ok(())
    }

    pub fn add_threat(&mut self, amount: u32) {
        self.threat += amount;
    }

    pub fn spend_threat(&mut self, amount: u32) -> Result<()> {
        if amount > self.threat {
            return Err(CombatError::InsufficientResource {
                resource: Resource::Threat,
                needed: amount,
                available: self.threat,
            });
        }
        self.threat -= amount;
        Ok(())
    }

    /// The pool a side spends from: Momentum for players, Threat for the GM
    pub fn spend_for(&mut self, side: Side, amount: u32) -> Result<()> {
        match side {
            Side::Player => self.spend_momentum(amount),
            Side::Enemy => self.spend_threat(amount),
        }
    }

    /// Check affordability without spending
    pub fn can_afford(&self, side: Side, amount: u32) -> Result<()> {
        let mut probe = *self;
        probe.spend_for(side, amount)
    }

    /// Bank generated Momentum for a side. Player Momentum goes to the shared
    /// pool (capped); NPC Momentum becomes Threat.
    pub fn bank_for(&mut self, side: Side, amount: u32, cap: u32) -> u32 {
        match side {
            Side::Player => self.add_momentum(amount, cap),
            Side::Enemy => {
                self.add_threat(amount);
                amount
            }
        }
    }
}
