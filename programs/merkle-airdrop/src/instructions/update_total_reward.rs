use alloy_primitives::{Address, U256};
use tracing::info;

use crate::{
    error::AirdropError,
    lock_account,
    state::{
        events::{AirdropEvent, TotalRewardUpdatedEvent},
        user_reward::{UserRewardRecord, UserRewardStatus},
    },
    MerkleAirdrop, Result,
};

/// Overrides the entitlement on record for `user`, creating the record if the
/// user never claimed.
/// CHECK:
///     1. The caller is an admin
///     2. The new entitlement is not below what the user already claimed,
///        counting an unconfirmed payout as claimed
pub fn handle_update_total_reward(
    airdrop: &MerkleAirdrop,
    caller: &Address,
    campaign_id: u64,
    user: &Address,
    new_total_reward: U256,
) -> Result<UserRewardStatus> {
    airdrop.require_admin(caller)?;

    let account = airdrop.campaign_account(campaign_id)?;
    let mut account = lock_account(&account);

    let record = account.user_rewards.get(user).copied().unwrap_or_default();
    let committed = record
        .claimed_reward
        .checked_add(account.in_flight_amount(user))
        .ok_or(AirdropError::ArithmeticError)?;
    if new_total_reward < committed {
        return Err(AirdropError::InvalidTotalReward {
            total_reward: new_total_reward,
            claimed_reward: committed,
        });
    }

    let record = UserRewardRecord {
        total_reward: new_total_reward,
        claimed_reward: record.claimed_reward,
        has_record: true,
    };
    let status = record.status()?;
    account.user_rewards.insert(*user, record);

    info!(
        "updated total reward of {} in campaign {} to {}",
        user, campaign_id, new_total_reward
    );

    airdrop.emit(AirdropEvent::TotalRewardUpdated(TotalRewardUpdatedEvent {
        campaign_id,
        user: *user,
        total_reward: status.total_reward,
        claimed_reward: status.claimed_reward,
        pending_reward: status.pending_reward,
        timestamp: airdrop.clock.unix_timestamp(),
    }));

    Ok(status)
}
