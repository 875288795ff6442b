use alloy_primitives::{Address, B256};
use tracing::info;

use crate::{
    lock_account,
    state::events::{AirdropEvent, RootRotatedEvent},
    MerkleAirdrop, Result,
};

/// Replaces the merkle root of a campaign. Allowed in any state.
///
/// Existing claim records are left alone: addresses that already claimed keep
/// the entitlement they proved and no longer need a proof. Only first-time
/// claimants are checked against the new root.
/// CHECK:
///     1. The caller is an admin
pub fn handle_rotate_root(
    airdrop: &MerkleAirdrop,
    caller: &Address,
    campaign_id: u64,
    new_root: [u8; 32],
    new_tree_version: u64,
) -> Result<()> {
    airdrop.require_admin(caller)?;

    let account = airdrop.campaign_account(campaign_id)?;
    let mut account = lock_account(&account);
    let campaign = &mut account.campaign;

    let old_root = campaign.merkle_root;
    let old_tree_version = campaign.tree_version;
    campaign.merkle_root = new_root;
    campaign.tree_version = new_tree_version;

    info!(
        "rotated root of campaign {} from {} (v{}) to {} (v{})",
        campaign_id,
        B256::from(old_root),
        old_tree_version,
        B256::from(new_root),
        new_tree_version
    );

    airdrop.emit(AirdropEvent::RootRotated(RootRotatedEvent {
        campaign_id,
        old_root: B256::from(old_root),
        new_root: B256::from(new_root),
        old_tree_version,
        new_tree_version,
        timestamp: airdrop.clock.unix_timestamp(),
    }));

    Ok(())
}
