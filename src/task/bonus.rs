//! Buying bonus d20s for a task

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::core::pools::ResourcePools;
use crate::core::types::Resource;

/// How the bonus dice are paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusDicePayment {
    /// Spend from the shared Momentum pool
    #[default]
    Momentum,
    /// A player pays by handing the GM Threat
    AddThreat,
    /// The GM pays from the Threat pool
    SpendThreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BonusDicePurchase {
    pub count: u8,
    pub payment: BonusDicePayment,
}

impl BonusDicePurchase {
    pub fn new(count: u8, payment: BonusDicePayment) -> Self {
        Self { count, payment }
    }

    /// Total cost, or an error when over the purchase cap
    pub fn cost(&self) -> Result<u32> {
        let cfg = config();
        if self.count > cfg.max_bonus_dice {
            return Err(CombatError::InsufficientResource {
                resource: Resource::BonusDice,
                needed: self.count as u32,
                available: cfg.max_bonus_dice as u32,
            });
        }
        Ok(cfg.bonus_dice_cost(self.count))
    }

    /// Check the purchase is affordable without paying
    pub fn check(&self, pools: &ResourcePools) -> Result<u32> {
        let mut probe = *pools;
        self.pay(&mut probe)
    }

    /// Pay for the dice. On error nothing is deducted.
    pub fn pay(&self, pools: &mut ResourcePools) -> Result<u32> {
        let cost = self.cost()?;
        if cost == 0 {
            return Ok(0);
        }
        match self.payment {
            BonusDicePayment::Momentum => pools.spend_momentum(cost)?,
            BonusDicePayment::AddThreat => pools.add_threat(cost),
            BonusDicePayment::SpendThreat => pools.spend_threat(cost)?,
        }
        debug!(count = self.count, cost, payment = ?self.payment, "Bonus dice purchased");
        Ok(cost)
    }
}
