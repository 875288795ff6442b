use std::sync::{Mutex, PoisonError};

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Emitted when a new campaign is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreatedEvent {
    pub campaign_id: u64,
    pub name: String,
    pub merkle_root: B256,
    pub total_reward: U256,
    pub tree_version: u64,
    pub start_ts: i64,
    pub end_ts: i64,
    /// Timestamp.
    pub timestamp: i64,
}

/// Emitted when a campaign is opened for claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignActivatedEvent {
    pub campaign_id: u64,
    pub timestamp: i64,
}

/// Emitted when a campaign's merkle root is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRotatedEvent {
    pub campaign_id: u64,
    pub old_root: B256,
    pub new_root: B256,
    pub old_tree_version: u64,
    pub new_tree_version: u64,
    pub timestamp: i64,
}

/// Emitted when tokens are claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaimedEvent {
    pub campaign_id: u64,
    /// User that claimed.
    pub claimant: Address,
    /// Amount paid out by this claim.
    pub claim_amount: U256,
    /// Entitlement on record for the user.
    pub total_reward: U256,
    /// Claimed so far, including this claim.
    pub claimed_reward: U256,
    pub pending_reward: U256,
    pub timestamp: i64,
}

/// Emitted when an admin corrects a user's entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalRewardUpdatedEvent {
    pub campaign_id: u64,
    pub user: Address,
    pub total_reward: U256,
    pub claimed_reward: U256,
    pub pending_reward: U256,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum AirdropEvent {
    CampaignCreated(CampaignCreatedEvent),
    CampaignActivated(CampaignActivatedEvent),
    RootRotated(RootRotatedEvent),
    RewardClaimed(RewardClaimedEvent),
    TotalRewardUpdated(TotalRewardUpdatedEvent),
}

impl AirdropEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AirdropEvent::CampaignCreated(_) => "CampaignCreated",
            AirdropEvent::CampaignActivated(_) => "CampaignActivated",
            AirdropEvent::RootRotated(_) => "RootRotated",
            AirdropEvent::RewardClaimed(_) => "RewardClaimed",
            AirdropEvent::TotalRewardUpdated(_) => "TotalRewardUpdated",
        }
    }

    pub fn campaign_id(&self) -> u64 {
        match self {
            AirdropEvent::CampaignCreated(e) => e.campaign_id,
            AirdropEvent::CampaignActivated(e) => e.campaign_id,
            AirdropEvent::RootRotated(e) => e.campaign_id,
            AirdropEvent::RewardClaimed(e) => e.campaign_id,
            AirdropEvent::TotalRewardUpdated(e) => e.campaign_id,
        }
    }
}

/// Receives every event the ledger emits, after the state change it
/// describes has been committed.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AirdropEvent);
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AirdropEvent) {
        info!(
            target: "airdrop_events",
            event = event.name(),
            campaign_id = event.campaign_id(),
            "{:?}",
            event
        );
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<AirdropEvent>>,
}

impl MemoryEventSink {
    pub fn events(&self) -> Vec<AirdropEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn drain(&self) -> Vec<AirdropEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: AirdropEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
