#![allow(dead_code)]

use std::sync::Arc;

use airdrop_merkle_tree::{airdrop_merkle_tree::AirdropMerkleTree, tree_node::TreeNode};
use alloy_primitives::{address, Address, U256};
use merkle_airdrop::{
    authority::AdminSet,
    clock::ManualClock,
    custodian::{CustodianError, InMemoryRewardPool, PayoutRequest, RewardCustodian},
    state::events::MemoryEventSink,
    MerkleAirdrop, NewCampaignArgs,
};

pub const ADMIN: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const USER1: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const USER2: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
pub const USER3: Address = address!("90F79bf6EB2c4f870365E785982E1f101E93b906");
pub const OUTSIDER: Address = address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65");

pub const START_TS: i64 = 1_700_000_000;
pub const END_TS: i64 = START_TS + 86_400;

/// `amount` whole tokens with 18 decimals.
pub fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

pub fn whitelist() -> AirdropMerkleTree {
    AirdropMerkleTree::new(
        vec![
            TreeNode::new(USER1, tokens(100)),
            TreeNode::new(USER2, tokens(200)),
            TreeNode::new(USER3, tokens(300)),
        ],
        1,
    )
    .unwrap()
}

pub fn proof_of(tree: &AirdropMerkleTree, claimant: &Address) -> (U256, Vec<[u8; 32]>) {
    let node = tree.get_node(claimant).unwrap();
    (node.amount, node.proof.unwrap())
}

/// A ledger with one admin, an in-memory pool and a manual clock.
pub struct Harness {
    pub airdrop: Arc<MerkleAirdrop>,
    pub pool: Arc<InMemoryRewardPool>,
    pub events: Arc<MemoryEventSink>,
    pub clock: Arc<ManualClock>,
    pub tree: AirdropMerkleTree,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_custodian_balance(tokens(1_000))
    }

    pub fn with_custodian_balance(balance: U256) -> Self {
        let pool = Arc::new(InMemoryRewardPool::new(balance));
        Self::with_custodian(pool.clone(), pool)
    }

    pub fn with_custodian(
        pool: Arc<InMemoryRewardPool>,
        custodian: Arc<dyn RewardCustodian>,
    ) -> Self {
        let events = Arc::new(MemoryEventSink::default());
        let clock = Arc::new(ManualClock::new(START_TS - 60));
        let airdrop = Arc::new(MerkleAirdrop::new(
            Arc::new(AdminSet::new([ADMIN])),
            custodian,
            events.clone(),
            clock.clone(),
        ));

        Self {
            airdrop,
            pool,
            events,
            clock,
            tree: whitelist(),
        }
    }

    pub fn create_campaign(&self) -> u64 {
        self.airdrop
            .create_campaign(
                &ADMIN,
                NewCampaignArgs {
                    name: "round one".to_string(),
                    merkle_root: self.tree.merkle_root,
                    total_reward: tokens(600),
                    start_ts: START_TS,
                    end_ts: END_TS,
                    tree_version: self.tree.tree_version,
                },
            )
            .unwrap()
    }

    /// Creates a campaign and activates it at its start time.
    pub fn active_campaign(&self) -> u64 {
        let campaign_id = self.create_campaign();
        self.clock.set(START_TS);
        self.airdrop.activate_campaign(&ADMIN, campaign_id).unwrap();
        campaign_id
    }
}

/// Fails the first `failures` transfers, then delegates to the pool. With
/// `settle_before_failing` the pool settles the transfer before the failure
/// is reported, like a timeout that raced a successful payout.
pub struct FlakyCustodian {
    pub pool: Arc<InMemoryRewardPool>,
    pub failures: std::sync::atomic::AtomicUsize,
    pub settle_before_failing: bool,
}

impl FlakyCustodian {
    /// A harness whose first `failures` transfers time out.
    pub fn harness(failures: usize, settle_before_failing: bool) -> (Harness, Arc<FlakyCustodian>) {
        let pool = Arc::new(InMemoryRewardPool::new(tokens(1_000)));
        let custodian = Arc::new(FlakyCustodian {
            pool: pool.clone(),
            failures: std::sync::atomic::AtomicUsize::new(failures),
            settle_before_failing,
        });
        (Harness::with_custodian(pool, custodian.clone()), custodian)
    }
}

impl RewardCustodian for FlakyCustodian {
    fn transfer_to(&self, request: &PayoutRequest) -> Result<(), CustodianError> {
        use std::sync::atomic::Ordering;

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !failing {
            return self.pool.transfer_to(request);
        }
        if self.settle_before_failing {
            self.pool.transfer_to(request)?;
        }
        Err(CustodianError::Timeout)
    }

    fn balance(&self) -> U256 {
        self.pool.balance()
    }
}
