use std::sync::{Arc, Mutex, PoisonError};

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AirdropError,
    state::{
        campaign::{Campaign, CampaignAccount},
        events::{AirdropEvent, CampaignCreatedEvent},
    },
    MerkleAirdrop, Result,
};

/// [MerkleAirdrop::create_campaign] arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaignArgs {
    pub name: String,
    /// The 256-bit merkle root.
    pub merkle_root: [u8; 32],
    /// Maximum number of tokens that can ever be claimed from this campaign.
    pub total_reward: U256,
    /// Claim window start (Unix Timestamp)
    pub start_ts: i64,
    /// Claim window end (Unix Timestamp)
    pub end_ts: i64,
    /// Version of the whitelist behind `merkle_root`
    pub tree_version: u64,
}

/// Creates a new, inactive campaign. Ids are handed out sequentially from 0.
/// CHECK:
///     1. The caller is an admin
///     2. The claim window ends after it starts
///     3. The campaign has something to distribute
pub fn handle_new_campaign(
    airdrop: &MerkleAirdrop,
    caller: &Address,
    args: NewCampaignArgs,
) -> Result<u64> {
    airdrop.require_admin(caller)?;

    if args.end_ts <= args.start_ts {
        return Err(AirdropError::InvalidTimeWindow {
            start_ts: args.start_ts,
            end_ts: args.end_ts,
        });
    }
    if args.total_reward == U256::ZERO {
        return Err(AirdropError::ZeroTotalReward);
    }

    let campaign_id = {
        let mut campaigns = airdrop
            .campaigns
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let campaign_id = campaigns.len() as u64;

        campaigns.push(Arc::new(Mutex::new(CampaignAccount::new(Campaign {
            id: campaign_id,
            name: args.name.clone(),
            merkle_root: args.merkle_root,
            tree_version: args.tree_version,
            total_reward: args.total_reward,
            claimed_reward: U256::ZERO,
            start_ts: args.start_ts,
            end_ts: args.end_ts,
            is_active: false,
        }))));
        campaign_id
    };

    info!(
        "created campaign {} ({}) with root {} and total reward {}",
        campaign_id,
        args.name,
        B256::from(args.merkle_root),
        args.total_reward
    );

    airdrop.emit(AirdropEvent::CampaignCreated(CampaignCreatedEvent {
        campaign_id,
        name: args.name,
        merkle_root: B256::from(args.merkle_root),
        total_reward: args.total_reward,
        tree_version: args.tree_version,
        start_ts: args.start_ts,
        end_ts: args.end_ts,
        timestamp: airdrop.clock.unix_timestamp(),
    }));

    Ok(campaign_id)
}
