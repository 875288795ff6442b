use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::AirdropError;

/// Accounting for one claimant in one campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewardRecord {
    /// Entitlement proven on the first claim
    pub total_reward: U256,
    /// Amount paid out so far
    pub claimed_reward: U256,
    pub has_record: bool,
}

impl UserRewardRecord {
    pub fn new(total_reward: U256) -> Self {
        Self {
            total_reward,
            claimed_reward: U256::ZERO,
            has_record: true,
        }
    }

    /// Amount still claimable: `total_reward - claimed_reward`
    pub fn pending_reward(&self) -> Result<U256, AirdropError> {
        self.total_reward
            .checked_sub(self.claimed_reward)
            .ok_or(AirdropError::ArithmeticError)
    }

    /// The record after paying out `amount`, or an error if it would claim
    /// more than is pending.
    pub fn after_claim(&self, amount: U256) -> Result<Self, AirdropError> {
        let pending = self.pending_reward()?;
        if amount > pending {
            return Err(AirdropError::ExceedsPending {
                requested: amount,
                pending,
            });
        }

        Ok(Self {
            claimed_reward: self
                .claimed_reward
                .checked_add(amount)
                .ok_or(AirdropError::ArithmeticError)?,
            ..*self
        })
    }

    pub fn is_fully_claimed(&self) -> bool {
        self.has_record && self.claimed_reward == self.total_reward
    }

    pub fn status(&self) -> Result<UserRewardStatus, AirdropError> {
        Ok(UserRewardStatus {
            total_reward: self.total_reward,
            claimed_reward: self.claimed_reward,
            pending_reward: self.pending_reward()?,
            has_record: self.has_record,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRewardStatus {
    pub total_reward: U256,
    pub claimed_reward: U256,
    pub pending_reward: U256,
    pub has_record: bool,
}
