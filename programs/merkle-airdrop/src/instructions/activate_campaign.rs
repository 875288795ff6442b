use alloy_primitives::Address;
use tracing::info;

use crate::{
    error::AirdropError,
    lock_account,
    state::events::{AirdropEvent, CampaignActivatedEvent},
    MerkleAirdrop, Result,
};

/// Opens a campaign for claims.
/// CHECK:
///     1. The caller is an admin
///     2. The campaign's start time has been reached
///     3. The campaign is not active yet
pub fn handle_activate_campaign(
    airdrop: &MerkleAirdrop,
    caller: &Address,
    campaign_id: u64,
) -> Result<()> {
    airdrop.require_admin(caller)?;

    let account = airdrop.campaign_account(campaign_id)?;
    let mut account = lock_account(&account);
    let campaign = &mut account.campaign;

    let curr_ts = airdrop.clock.unix_timestamp();
    if !campaign.has_started(curr_ts) {
        return Err(AirdropError::NotStarted {
            start_ts: campaign.start_ts,
            curr_ts,
        });
    }
    if campaign.is_active {
        return Err(AirdropError::AlreadyActive(campaign_id));
    }

    campaign.is_active = true;
    info!("activated campaign {}", campaign_id);

    airdrop.emit(AirdropEvent::CampaignActivated(CampaignActivatedEvent {
        campaign_id,
        timestamp: curr_ts,
    }));

    Ok(())
}
