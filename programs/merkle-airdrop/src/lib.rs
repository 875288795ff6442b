//! Campaign registry and claim ledger for rewards committed to by a [Merkle root](https://en.wikipedia.org/wiki/Merkle_tree).
//!
//! Claims follow the sorted-pair proofs of OpenZeppelin's `MerkleProof`, so trees built by
//! `airdrop-merkle-tree` and by the usual JavaScript tooling are interchangeable. On top of a
//! one-shot distributor, the ledger allows partial claims and root rotation.
//!
//! # Rationale
//!
//! Sending tokens to every whitelisted address up front costs one transfer per address, whether
//! or not the recipient ever wants the tokens. Committing to the whole whitelist with a single
//! 256-bit root puts the work on the claimer instead: each claimant proves their own entitlement
//! once and then withdraws it, in one go or in several smaller claims.
//!
//! # Campaigns
//!
//! A campaign is one bounded distribution round. An admin creates it with a root and a budget,
//! activates it once its start time has passed, and may rotate its root at any time. Rotation
//! never touches existing claim records: an address that already proved an entitlement keeps it
//! and can keep claiming without a new proof.
//!
//! All state of a campaign, including its claim records, sits behind one lock. Claims, rotations
//! and entitlement updates of the same campaign are serialised; different campaigns do not
//! contend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use airdrop_merkle_verify::leaf_hash;
use alloy_primitives::{Address, U256};
use tracing::debug;

pub mod authority;
pub mod clock;
pub mod custodian;
pub mod error;
pub mod instructions;
pub mod state;

pub use instructions::*;

use crate::{
    authority::Authority,
    clock::Clock,
    custodian::RewardCustodian,
    error::AirdropError,
    state::{
        campaign::{CampaignAccount, CampaignInfo},
        events::{AirdropEvent, EventSink},
        user_reward::UserRewardStatus,
    },
};

pub type Result<T> = std::result::Result<T, AirdropError>;

pub struct MerkleAirdrop {
    pub(crate) campaigns: RwLock<Vec<Arc<Mutex<CampaignAccount>>>>,
    pub(crate) authority: Arc<dyn Authority>,
    pub(crate) custodian: Arc<dyn RewardCustodian>,
    pub(crate) event_sink: Arc<dyn EventSink>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MerkleAirdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleAirdrop")
            .field("campaigns", &self.campaign_count())
            .field("pool_balance", &self.custodian.balance())
            .finish()
    }
}

impl MerkleAirdrop {
    pub fn new(
        authority: Arc<dyn Authority>,
        custodian: Arc<dyn RewardCustodian>,
        event_sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaigns: RwLock::new(Vec::new()),
            authority,
            custodian,
            event_sink,
            clock,
        }
    }

    /// Registers a new, inactive campaign and returns its id.
    pub fn create_campaign(&self, caller: &Address, args: NewCampaignArgs) -> Result<u64> {
        handle_new_campaign(self, caller, args)
    }

    pub fn activate_campaign(&self, caller: &Address, campaign_id: u64) -> Result<()> {
        handle_activate_campaign(self, caller, campaign_id)
    }

    pub fn rotate_root(
        &self,
        caller: &Address,
        campaign_id: u64,
        new_root: [u8; 32],
        new_tree_version: u64,
    ) -> Result<()> {
        handle_rotate_root(self, caller, campaign_id, new_root, new_tree_version)
    }

    /// Claims `claim_amount` of the `total_reward` entitlement proven by `proof`.
    /// The proof is only checked on the first claim of an address.
    pub fn claim(
        &self,
        campaign_id: u64,
        claimant: &Address,
        claim_amount: U256,
        total_reward: U256,
        proof: &[[u8; 32]],
    ) -> Result<ClaimReceipt> {
        handle_claim(self, campaign_id, claimant, claim_amount, total_reward, proof)
    }

    pub fn update_user_total_reward(
        &self,
        caller: &Address,
        campaign_id: u64,
        user: &Address,
        new_total_reward: U256,
    ) -> Result<UserRewardStatus> {
        handle_update_total_reward(self, caller, campaign_id, user, new_total_reward)
    }

    pub fn get_campaign(&self, campaign_id: u64) -> Result<CampaignInfo> {
        let account = self.campaign_account(campaign_id)?;
        let account = lock_account(&account);
        CampaignInfo::new(&account.campaign, self.custodian.balance())
    }

    pub fn list_campaigns(&self) -> Result<Vec<CampaignInfo>> {
        (0..self.campaign_count() as u64)
            .map(|id| self.get_campaign(id))
            .collect()
    }

    pub fn campaign_count(&self) -> usize {
        self.campaigns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn get_user_status(&self, campaign_id: u64, user: &Address) -> Result<UserRewardStatus> {
        let account = self.campaign_account(campaign_id)?;
        let account = lock_account(&account);
        account
            .user_rewards
            .get(user)
            .copied()
            .unwrap_or_default()
            .status()
    }

    /// True once the user has claimed at least once in the campaign.
    pub fn is_claimed(&self, campaign_id: u64, user: &Address) -> Result<bool> {
        Ok(self.get_user_status(campaign_id, user)?.has_record)
    }

    /// True once the user has claimed their whole entitlement.
    pub fn is_fully_claimed(&self, campaign_id: u64, user: &Address) -> Result<bool> {
        let status = self.get_user_status(campaign_id, user)?;
        Ok(status.has_record && status.pending_reward == U256::ZERO)
    }

    /// The leaf a whitelist entry is committed to.
    pub fn calculate_leaf_hash(&self, user: &Address, total_reward: U256) -> [u8; 32] {
        leaf_hash(user, total_reward)
    }

    pub fn pool_balance(&self) -> U256 {
        self.custodian.balance()
    }

    pub(crate) fn campaign_account(&self, campaign_id: u64) -> Result<Arc<Mutex<CampaignAccount>>> {
        let campaigns = self.campaigns.read().unwrap_or_else(PoisonError::into_inner);
        usize::try_from(campaign_id)
            .ok()
            .and_then(|index| campaigns.get(index))
            .cloned()
            .ok_or(AirdropError::NotFound(campaign_id))
    }

    pub(crate) fn require_admin(&self, caller: &Address) -> Result<()> {
        if self.authority.is_admin(caller) {
            Ok(())
        } else {
            debug!("rejected admin call from {}", caller);
            Err(AirdropError::Unauthorized(*caller))
        }
    }

    pub(crate) fn emit(&self, event: AirdropEvent) {
        self.event_sink.emit(event);
    }
}

/// State is only written after every check and the payout have succeeded, so
/// a poisoned lock still guards consistent data.
pub(crate) fn lock_account(account: &Mutex<CampaignAccount>) -> MutexGuard<'_, CampaignAccount> {
    account.lock().unwrap_or_else(PoisonError::into_inner)
}
