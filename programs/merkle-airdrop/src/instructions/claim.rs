use airdrop_merkle_verify::verify_claim;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    custodian::PayoutRequest,
    error::AirdropError,
    lock_account,
    state::{
        campaign::{CampaignAccount, InFlightPayout},
        events::{AirdropEvent, RewardClaimedEvent},
        user_reward::UserRewardRecord,
    },
    MerkleAirdrop, Result,
};

/// Totals of the claimant right after a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub claimed_reward: U256,
    pub pending_reward: U256,
}

/// Pays out part or all of a claimant's entitlement.
/// 1. Settles the claimant's unconfirmed payout, if there is one
/// 2. Creates the claim record on the first claim, from the proven `total_reward`
/// 3. Transfers `claim_amount` to the claimant through the custodian
/// 4. Increments the claimant's and the campaign's claimed totals
/// CHECK:
///     1. The campaign is active
///     2. The claim window contains the current time
///     3. The merkle proof is valid, when the claimant has no record yet
///     4. The claim amount is non-zero and within the pending reward
///     5. The campaign budget, less unconfirmed payouts, covers the claim
///
/// Nothing is written unless the transfer succeeds. A transfer that fails
/// without ruling out settlement is kept in flight and re-submitted with the
/// same key on the claimant's next claim. If that next claim asks for the same
/// amount it is the retry, and its receipt is returned as is.
///
/// The campaign lock is held across the transfer so claims of the same
/// campaign never interleave.
pub fn handle_claim(
    airdrop: &MerkleAirdrop,
    campaign_id: u64,
    claimant: &Address,
    claim_amount: U256,
    total_reward: U256,
    proof: &[[u8; 32]],
) -> Result<ClaimReceipt> {
    let account = airdrop.campaign_account(campaign_id)?;
    let mut account = lock_account(&account);

    if !account.campaign.is_active {
        return Err(AirdropError::NotActive(campaign_id));
    }

    let curr_ts = airdrop.clock.unix_timestamp();
    if !account.campaign.is_within_claim_window(curr_ts) {
        return Err(AirdropError::TimeExpired {
            curr_ts,
            start_ts: account.campaign.start_ts,
            end_ts: account.campaign.end_ts,
        });
    }

    let retried_amount = account.in_flight.get(claimant).map(|p| p.request.amount);
    if let Some(receipt) = resolve_in_flight(airdrop, &mut account, claimant, curr_ts)? {
        if retried_amount == Some(claim_amount) {
            return Ok(receipt);
        }
    }

    // The stored entitlement is authoritative once a record exists, so a
    // supplied proof and total are ignored from the second claim on.
    let record = match account.user_rewards.get(claimant) {
        Some(record) if record.has_record => *record,
        _ => {
            if !verify_claim(proof, account.campaign.merkle_root, claimant, total_reward) {
                debug!(
                    "rejected proof of {} for {} in campaign {}",
                    claimant, total_reward, campaign_id
                );
                return Err(AirdropError::InvalidProof);
            }
            UserRewardRecord::new(total_reward)
        }
    };

    if claim_amount == U256::ZERO {
        return Err(AirdropError::ZeroClaimAmount);
    }
    record.after_claim(claim_amount)?;

    let remaining = account.available_reward()?;
    if claim_amount > remaining {
        return Err(AirdropError::ExceedsCampaignBudget {
            requested: claim_amount,
            remaining,
        });
    }

    let payout = PayoutRequest::new(campaign_id, *claimant, record.claimed_reward, claim_amount);
    if let Err(e) = airdrop.custodian.transfer_to(&payout) {
        warn!(
            "payout of {} to {} in campaign {} failed: {}",
            claim_amount, claimant, campaign_id, e
        );
        if e.may_have_settled() {
            account.in_flight.insert(
                *claimant,
                InFlightPayout {
                    request: payout,
                    record,
                },
            );
        }
        return Err(AirdropError::CustodianTransfer(e));
    }

    commit_claim(airdrop, &mut account, claimant, record, claim_amount, curr_ts)
}

/// Re-submits the claimant's unconfirmed payout. Returns the receipt when it
/// settled and `None` when there was nothing to settle or the custodian
/// definitely did not pay.
fn resolve_in_flight(
    airdrop: &MerkleAirdrop,
    account: &mut CampaignAccount,
    claimant: &Address,
    curr_ts: i64,
) -> Result<Option<ClaimReceipt>> {
    let Some(in_flight) = account.in_flight.get(claimant).cloned() else {
        return Ok(None);
    };

    match airdrop.custodian.transfer_to(&in_flight.request) {
        Ok(()) => {
            account.in_flight.remove(claimant);
            // an admin correction since the payout wins over the stale copy
            let record = match account.user_rewards.get(claimant) {
                Some(record) if record.has_record => *record,
                _ => in_flight.record,
            };
            commit_claim(
                airdrop,
                account,
                claimant,
                record,
                in_flight.request.amount,
                curr_ts,
            )
            .map(Some)
        }
        Err(e) if e.may_have_settled() => {
            warn!(
                "payout of {} to {} in campaign {} still unconfirmed: {}",
                in_flight.request.amount, claimant, account.campaign.id, e
            );
            Err(AirdropError::CustodianTransfer(e))
        }
        Err(e) => {
            debug!(
                "dropping unsettled payout of {} to {}: {}",
                in_flight.request.amount, claimant, e
            );
            account.in_flight.remove(claimant);
            Ok(None)
        }
    }
}

/// Books a payout the custodian confirmed.
fn commit_claim(
    airdrop: &MerkleAirdrop,
    account: &mut CampaignAccount,
    claimant: &Address,
    record: UserRewardRecord,
    claim_amount: U256,
    curr_ts: i64,
) -> Result<ClaimReceipt> {
    let campaign_id = account.campaign.id;
    let updated = record.after_claim(claim_amount)?;
    let status = updated.status()?;
    let campaign_claimed = account
        .campaign
        .claimed_reward
        .checked_add(claim_amount)
        .ok_or(AirdropError::ArithmeticError)?;

    account.user_rewards.insert(*claimant, updated);
    account.campaign.claimed_reward = campaign_claimed;

    info!(
        "{} claimed {} in campaign {}, {} of {} claimed",
        claimant, claim_amount, campaign_id, status.claimed_reward, status.total_reward
    );

    airdrop.emit(AirdropEvent::RewardClaimed(RewardClaimedEvent {
        campaign_id,
        claimant: *claimant,
        claim_amount,
        total_reward: status.total_reward,
        claimed_reward: status.claimed_reward,
        pending_reward: status.pending_reward,
        timestamp: curr_ts,
    }));

    Ok(ClaimReceipt {
        claimed_reward: status.claimed_reward,
        pending_reward: status.pending_reward,
    })
}
