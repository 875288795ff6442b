use std::sync::Arc;

use merkle_airdrop::{
    authority::AdminSet,
    clock::ManualClock,
    custodian::InMemoryRewardPool,
    state::events::{AirdropEvent, MemoryEventSink},
    MerkleAirdrop, NewCampaignArgs,
};

use crate::*;

const SIMULATION_START_TS: i64 = 0;
const SIMULATION_DURATION: i64 = 86_400;

/// Builds a throwaway campaign funded with the tree total and runs the
/// requested claims against it, printing every outcome.
pub fn process_simulate_claim(args: &SimulateClaimArgs) -> Result<()> {
    let merkle_tree = AirdropMerkleTree::new_from_file(&args.merkle_tree_path)?;
    let summary = simulate_claims(&merkle_tree, args)?;

    println!(
        "{} claims accepted, {} rejected, {} of {} claimed",
        summary.accepted, summary.rejected, summary.claimed_reward, summary.total_reward
    );
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub struct SimulationSummary {
    pub accepted: u32,
    pub rejected: u32,
    pub claimed_reward: U256,
    pub total_reward: U256,
}

pub fn simulate_claims(
    merkle_tree: &AirdropMerkleTree,
    args: &SimulateClaimArgs,
) -> Result<SimulationSummary> {
    let admin = Address::ZERO;
    let events = Arc::new(MemoryEventSink::default());
    let airdrop = MerkleAirdrop::new(
        Arc::new(AdminSet::new([admin])),
        Arc::new(InMemoryRewardPool::new(merkle_tree.max_total_claim)),
        events.clone(),
        Arc::new(ManualClock::new(SIMULATION_START_TS)),
    );

    let campaign_id = airdrop.create_campaign(
        &admin,
        NewCampaignArgs {
            name: format!("simulation v{}", merkle_tree.tree_version),
            merkle_root: merkle_tree.merkle_root,
            total_reward: merkle_tree.max_total_claim,
            start_ts: SIMULATION_START_TS,
            end_ts: SIMULATION_START_TS + SIMULATION_DURATION,
            tree_version: merkle_tree.tree_version,
        },
    )?;
    airdrop.activate_campaign(&admin, campaign_id)?;

    let nodes = match args.address {
        Some(address) => vec![merkle_tree.get_node(&address)?],
        None => merkle_tree.tree_nodes.clone(),
    };

    let (mut accepted, mut rejected) = (0, 0);
    for node in nodes {
        let proof = node.proof.clone().unwrap_or_default();
        let amount = args.amount.unwrap_or(node.amount);

        for _ in 0..args.repeat {
            match airdrop.claim(campaign_id, &node.claimant, amount, node.amount, &proof) {
                Ok(receipt) => {
                    accepted += 1;
                    println!(
                        "{} claimed {}: claimed {}, pending {}",
                        node.claimant, amount, receipt.claimed_reward, receipt.pending_reward
                    );
                }
                Err(e) => {
                    rejected += 1;
                    println!("{} failed to claim {}: {} ({})", node.claimant, amount, e, e.code());
                }
            }
        }
    }

    for event in events.drain() {
        if let AirdropEvent::RewardClaimed(e) = event {
            tracing::debug!("RewardClaimed {:?}", e);
        }
    }

    let campaign = airdrop.get_campaign(campaign_id)?;
    Ok(SimulationSummary {
        accepted,
        rejected,
        claimed_reward: campaign.claimed_reward,
        total_reward: campaign.total_reward,
    })
}
