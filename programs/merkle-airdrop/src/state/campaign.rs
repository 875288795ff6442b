use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{custodian::PayoutRequest, error::AirdropError, state::user_reward::UserRewardRecord};

/// State of one distribution round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Sequential id, starting at 0
    pub id: u64,
    pub name: String,
    /// The 256-bit merkle root claims are currently proven against.
    pub merkle_root: [u8; 32],
    /// Version of the whitelist behind `merkle_root`
    pub tree_version: u64,
    /// Maximum number of tokens that can ever be claimed from this campaign.
    pub total_reward: U256,
    /// Total amount of tokens that have been claimed.
    pub claimed_reward: U256,
    /// Claim window start (Unix Timestamp), inclusive
    pub start_ts: i64,
    /// Claim window end (Unix Timestamp), inclusive
    pub end_ts: i64,
    pub is_active: bool,
}

impl Campaign {
    pub fn remaining_reward(&self) -> Result<U256, AirdropError> {
        self.total_reward
            .checked_sub(self.claimed_reward)
            .ok_or(AirdropError::ArithmeticError)
    }

    pub fn is_within_claim_window(&self, curr_ts: i64) -> bool {
        self.start_ts <= curr_ts && curr_ts <= self.end_ts
    }

    pub fn has_started(&self, curr_ts: i64) -> bool {
        curr_ts >= self.start_ts
    }
}

/// Read-only snapshot of a campaign with its derived balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub id: u64,
    pub name: String,
    pub merkle_root: B256,
    pub tree_version: u64,
    pub total_reward: U256,
    pub claimed_reward: U256,
    pub remaining_reward: U256,
    /// Balance currently held by the reward custodian
    pub pool_balance: U256,
    pub start_ts: i64,
    pub end_ts: i64,
    pub is_active: bool,
}

impl CampaignInfo {
    pub(crate) fn new(campaign: &Campaign, pool_balance: U256) -> Result<Self, AirdropError> {
        Ok(Self {
            id: campaign.id,
            name: campaign.name.clone(),
            merkle_root: B256::from(campaign.merkle_root),
            tree_version: campaign.tree_version,
            total_reward: campaign.total_reward,
            claimed_reward: campaign.claimed_reward,
            remaining_reward: campaign.remaining_reward()?,
            pool_balance,
            start_ts: campaign.start_ts,
            end_ts: campaign.end_ts,
            is_active: campaign.is_active,
        })
    }
}

/// A payout the custodian failed to confirm. Its funds may or may not have
/// moved, so it is re-submitted before the claimant can claim again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InFlightPayout {
    pub request: PayoutRequest,
    /// Claimant record the payout was computed from
    pub record: UserRewardRecord,
}

/// A campaign together with the claim records that belong to it. Everything
/// in here is guarded by one lock.
#[derive(Debug)]
pub(crate) struct CampaignAccount {
    pub campaign: Campaign,
    pub user_rewards: HashMap<Address, UserRewardRecord>,
    /// At most one unconfirmed payout per claimant
    pub in_flight: HashMap<Address, InFlightPayout>,
}

impl CampaignAccount {
    pub fn new(campaign: Campaign) -> Self {
        Self {
            campaign,
            user_rewards: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Amount reserved by unconfirmed payouts.
    pub fn in_flight_total(&self) -> Result<U256, AirdropError> {
        self.in_flight.values().try_fold(U256::ZERO, |acc, p| {
            acc.checked_add(p.request.amount)
                .ok_or(AirdropError::ArithmeticError)
        })
    }

    /// Remaining budget minus what unconfirmed payouts may already have paid.
    pub fn available_reward(&self) -> Result<U256, AirdropError> {
        self.campaign
            .remaining_reward()?
            .checked_sub(self.in_flight_total()?)
            .ok_or(AirdropError::ArithmeticError)
    }

    pub fn in_flight_amount(&self, claimant: &Address) -> U256 {
        self.in_flight
            .get(claimant)
            .map(|p| p.request.amount)
            .unwrap_or_default()
    }
}
