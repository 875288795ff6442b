mod common;

use alloy_primitives::U256;
use common::*;
use merkle_airdrop::{
    custodian::RewardCustodian,
    error::AirdropError,
    state::events::{AirdropEvent, RewardClaimedEvent},
    ClaimReceipt,
};

#[test]
fn test_full_claim_then_nothing_left() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();
    h.events.drain();

    let (total, proof) = proof_of(&h.tree, &USER1);
    let receipt = h
        .airdrop
        .claim(campaign_id, &USER1, tokens(100), total, &proof)
        .unwrap();
    assert_eq!(
        receipt,
        ClaimReceipt {
            claimed_reward: tokens(100),
            pending_reward: U256::ZERO,
        }
    );

    assert_eq!(
        h.events.drain(),
        vec![AirdropEvent::RewardClaimed(RewardClaimedEvent {
            campaign_id,
            claimant: USER1,
            claim_amount: tokens(100),
            total_reward: tokens(100),
            claimed_reward: tokens(100),
            pending_reward: U256::ZERO,
            timestamp: START_TS,
        })]
    );

    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, U256::from(1u64), total, &proof)
            .unwrap_err(),
        AirdropError::ExceedsPending {
            requested: U256::from(1u64),
            pending: U256::ZERO,
        }
    );
    assert!(h.airdrop.is_claimed(campaign_id, &USER1).unwrap());
    assert!(h.airdrop.is_fully_claimed(campaign_id, &USER1).unwrap());
    assert_eq!(h.pool.paid_to(&USER1), tokens(100));
}

#[test]
fn test_partial_claims_need_proof_only_once() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER2);
    h.airdrop
        .claim(campaign_id, &USER2, tokens(100), total, &proof)
        .unwrap();
    assert!(h.airdrop.is_claimed(campaign_id, &USER2).unwrap());
    assert!(!h.airdrop.is_fully_claimed(campaign_id, &USER2).unwrap());

    let receipt = h
        .airdrop
        .claim(campaign_id, &USER2, tokens(100), U256::ZERO, &[])
        .unwrap();
    assert_eq!(receipt.claimed_reward, tokens(200));
    assert_eq!(receipt.pending_reward, U256::ZERO);

    let campaign = h.airdrop.get_campaign(campaign_id).unwrap();
    assert_eq!(campaign.claimed_reward, tokens(200));
    assert_eq!(campaign.remaining_reward, tokens(400));
    assert_eq!(campaign.pool_balance, tokens(800));
}

#[test]
fn test_claim_over_pending_leaves_state_untouched() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER3);
    h.airdrop
        .claim(campaign_id, &USER3, tokens(200), total, &proof)
        .unwrap();

    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER3, tokens(200), total, &[])
            .unwrap_err()
            .to_string(),
        "claim amount exceed pending reward"
    );

    let status = h.airdrop.get_user_status(campaign_id, &USER3).unwrap();
    assert_eq!(status.total_reward, tokens(300));
    assert_eq!(status.claimed_reward, tokens(200));
    assert_eq!(status.pending_reward, tokens(100));
    assert!(status.has_record);
}

#[test]
fn test_claim_before_start_is_expired_and_records_nothing() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();
    h.clock.set(START_TS - 5);

    let (total, proof) = proof_of(&h.tree, &USER1);
    let err = h
        .airdrop
        .claim(campaign_id, &USER1, tokens(10), total, &proof)
        .unwrap_err();
    assert_eq!(err.to_string(), "Time expired");
    assert_eq!(err.code(), "TIME_EXPIRED");

    let status = h.airdrop.get_user_status(campaign_id, &USER1).unwrap();
    assert!(!status.has_record);
    assert_eq!(status.claimed_reward, U256::ZERO);
}

#[test]
fn test_claim_window_boundaries_are_inclusive() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();
    let (total, proof) = proof_of(&h.tree, &USER3);

    h.airdrop
        .claim(campaign_id, &USER3, tokens(1), total, &proof)
        .unwrap();

    h.clock.set(END_TS);
    h.airdrop
        .claim(campaign_id, &USER3, tokens(1), total, &[])
        .unwrap();

    h.clock.set(END_TS + 1);
    assert!(matches!(
        h.airdrop.claim(campaign_id, &USER3, tokens(1), total, &[]),
        Err(AirdropError::TimeExpired { .. })
    ));
}

#[test]
fn test_proof_of_another_user_is_rejected() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (user2_total, user2_proof) = proof_of(&h.tree, &USER2);
    let (user1_total, _) = proof_of(&h.tree, &USER1);

    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(100), user1_total, &user2_proof)
            .unwrap_err(),
        AirdropError::InvalidProof
    );
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(100), user2_total, &user2_proof)
            .unwrap_err()
            .to_string(),
        "Invalid merkle proof"
    );
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &OUTSIDER, tokens(1), user2_total, &user2_proof)
            .unwrap_err(),
        AirdropError::InvalidProof
    );
    assert!(!h.airdrop.is_claimed(campaign_id, &USER1).unwrap());
}

#[test]
fn test_inflated_entitlement_is_rejected() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (_, proof) = proof_of(&h.tree, &USER1);
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(1), tokens(1_000), &proof)
            .unwrap_err(),
        AirdropError::InvalidProof
    );
}

#[test]
fn test_inactive_or_unknown_campaign() {
    let h = Harness::new();
    let campaign_id = h.create_campaign();
    h.clock.set(START_TS);

    let (total, proof) = proof_of(&h.tree, &USER1);
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(1), total, &proof)
            .unwrap_err(),
        AirdropError::NotActive(campaign_id)
    );
    assert_eq!(
        h.airdrop
            .claim(42, &USER1, tokens(1), total, &proof)
            .unwrap_err(),
        AirdropError::NotFound(42)
    );
}

#[test]
fn test_zero_claim_is_rejected() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER1);
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, U256::ZERO, total, &proof)
            .unwrap_err(),
        AirdropError::ZeroClaimAmount
    );
    assert!(!h.airdrop.is_claimed(campaign_id, &USER1).unwrap());
}

#[test]
fn test_rotation_preserves_existing_records() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER2);
    h.airdrop
        .claim(campaign_id, &USER2, tokens(50), total, &proof)
        .unwrap();
    let before = h.airdrop.get_user_status(campaign_id, &USER2).unwrap();

    // the new whitelist lowers user2 and adds an outsider
    let rotated = airdrop_merkle_tree::airdrop_merkle_tree::AirdropMerkleTree::new(
        vec![
            airdrop_merkle_tree::tree_node::TreeNode::new(USER2, tokens(10)),
            airdrop_merkle_tree::tree_node::TreeNode::new(OUTSIDER, tokens(40)),
        ],
        2,
    )
    .unwrap();
    h.airdrop
        .rotate_root(&ADMIN, campaign_id, rotated.merkle_root, rotated.tree_version)
        .unwrap();

    assert_eq!(h.airdrop.get_user_status(campaign_id, &USER2).unwrap(), before);
    let receipt = h
        .airdrop
        .claim(campaign_id, &USER2, tokens(150), U256::ZERO, &[])
        .unwrap();
    assert_eq!(receipt.claimed_reward, tokens(200));

    // first-time claimants are checked against the new root only
    let (old_total, old_proof) = proof_of(&h.tree, &USER1);
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(1), old_total, &old_proof)
            .unwrap_err(),
        AirdropError::InvalidProof
    );
    let (new_total, new_proof) = proof_of(&rotated, &OUTSIDER);
    h.airdrop
        .claim(campaign_id, &OUTSIDER, tokens(40), new_total, &new_proof)
        .unwrap();

    let campaign = h.airdrop.get_campaign(campaign_id).unwrap();
    assert_eq!(campaign.tree_version, 2);
    assert_eq!(campaign.merkle_root.0, rotated.merkle_root);
}

#[test]
fn test_campaign_budget_caps_claims() {
    let h = Harness::new();
    let campaign_id = h.active_campaign();

    // an over-generous correction cannot drain more than the campaign budget
    h.airdrop
        .update_user_total_reward(&ADMIN, campaign_id, &OUTSIDER, tokens(700))
        .unwrap();
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &OUTSIDER, tokens(601), U256::ZERO, &[])
            .unwrap_err(),
        AirdropError::ExceedsCampaignBudget {
            requested: tokens(601),
            remaining: tokens(600),
        }
    );
    h.airdrop
        .claim(campaign_id, &OUTSIDER, tokens(600), U256::ZERO, &[])
        .unwrap();
    assert_eq!(
        h.airdrop.get_campaign(campaign_id).unwrap().remaining_reward,
        U256::ZERO
    );
}

#[test]
fn test_failed_payout_changes_nothing() {
    let h = Harness::with_custodian_balance(tokens(50));
    let campaign_id = h.active_campaign();
    h.events.drain();

    let (total, proof) = proof_of(&h.tree, &USER1);
    let err = h
        .airdrop
        .claim(campaign_id, &USER1, tokens(100), total, &proof)
        .unwrap_err();
    assert!(matches!(err, AirdropError::CustodianTransfer(_)));
    assert!(err.is_retryable());

    assert!(!h.airdrop.is_claimed(campaign_id, &USER1).unwrap());
    assert_eq!(
        h.airdrop.get_campaign(campaign_id).unwrap().claimed_reward,
        U256::ZERO
    );
    assert!(h.events.events().is_empty());

    h.pool.deposit(tokens(50)).unwrap();
    h.airdrop
        .claim(campaign_id, &USER1, tokens(100), total, &proof)
        .unwrap();
    assert_eq!(h.pool.balance(), U256::ZERO);
}

#[test]
fn test_retry_after_settled_timeout_pays_once() {
    let pool = std::sync::Arc::new(merkle_airdrop::custodian::InMemoryRewardPool::new(
        tokens(1_000),
    ));
    let custodian = std::sync::Arc::new(FlakyCustodian {
        pool: pool.clone(),
        failures: std::sync::atomic::AtomicUsize::new(1),
        settle_before_failing: true,
    });
    let h = Harness::with_custodian(pool, custodian);
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER2);
    assert!(matches!(
        h.airdrop.claim(campaign_id, &USER2, tokens(50), total, &proof),
        Err(AirdropError::CustodianTransfer(_))
    ));
    assert!(!h.airdrop.is_claimed(campaign_id, &USER2).unwrap());

    h.airdrop
        .claim(campaign_id, &USER2, tokens(50), total, &proof)
        .unwrap();
    assert_eq!(h.pool.paid_to(&USER2), tokens(50));
    assert_eq!(h.pool.balance(), tokens(950));

    // the next claim starts from a new state and pays again
    h.airdrop
        .claim(campaign_id, &USER2, tokens(50), U256::ZERO, &[])
        .unwrap();
    assert_eq!(h.pool.paid_to(&USER2), tokens(100));
}

#[test]
fn test_retry_with_other_amount_after_settled_timeout() {
    let (h, _) = FlakyCustodian::harness(1, true);
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER1);
    assert!(matches!(
        h.airdrop.claim(campaign_id, &USER1, tokens(100), total, &proof),
        Err(AirdropError::CustodianTransfer(_))
    ));
    assert_eq!(h.pool.paid_to(&USER1), tokens(100));

    // the settled payout is booked first, leaving nothing for the new amount
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(60), total, &proof)
            .unwrap_err(),
        AirdropError::ExceedsPending {
            requested: tokens(60),
            pending: U256::ZERO,
        }
    );
    assert!(h.airdrop.is_fully_claimed(campaign_id, &USER1).unwrap());
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &USER1, tokens(40), U256::ZERO, &[])
            .unwrap_err(),
        AirdropError::ExceedsPending {
            requested: tokens(40),
            pending: U256::ZERO,
        }
    );

    assert_eq!(h.pool.paid_to(&USER1), tokens(100));
    assert_eq!(
        h.airdrop.get_campaign(campaign_id).unwrap().claimed_reward,
        tokens(100)
    );
}

#[test]
fn test_smaller_retry_books_settled_payout_then_pays() {
    let (h, _) = FlakyCustodian::harness(1, true);
    let campaign_id = h.active_campaign();
    h.events.drain();

    let (total, proof) = proof_of(&h.tree, &USER2);
    h.airdrop
        .claim(campaign_id, &USER2, tokens(50), total, &proof)
        .unwrap_err();

    let receipt = h
        .airdrop
        .claim(campaign_id, &USER2, tokens(30), total, &proof)
        .unwrap();
    assert_eq!(
        receipt,
        ClaimReceipt {
            claimed_reward: tokens(80),
            pending_reward: tokens(120),
        }
    );
    assert_eq!(h.pool.paid_to(&USER2), tokens(80));

    let amounts: Vec<_> = h
        .events
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            AirdropEvent::RewardClaimed(e) => Some(e.claim_amount),
            _ => None,
        })
        .collect();
    assert_eq!(amounts, vec![tokens(50), tokens(30)]);
}

#[test]
fn test_unconfirmed_payout_reserves_budget_until_retried() {
    let (h, _) = FlakyCustodian::harness(1, false);
    let campaign_id = h.active_campaign();

    let (total, proof) = proof_of(&h.tree, &USER3);
    h.airdrop
        .claim(campaign_id, &USER3, tokens(300), total, &proof)
        .unwrap_err();
    assert_eq!(h.pool.paid_to(&USER3), U256::ZERO);

    assert_eq!(
        h.airdrop
            .update_user_total_reward(&ADMIN, campaign_id, &USER3, tokens(200))
            .unwrap_err(),
        AirdropError::InvalidTotalReward {
            total_reward: tokens(200),
            claimed_reward: tokens(300),
        }
    );

    h.airdrop
        .update_user_total_reward(&ADMIN, campaign_id, &OUTSIDER, tokens(400))
        .unwrap();
    assert_eq!(
        h.airdrop
            .claim(campaign_id, &OUTSIDER, tokens(400), U256::ZERO, &[])
            .unwrap_err(),
        AirdropError::ExceedsCampaignBudget {
            requested: tokens(400),
            remaining: tokens(300),
        }
    );

    // the retry pays the original request exactly once
    let receipt = h
        .airdrop
        .claim(campaign_id, &USER3, tokens(300), total, &proof)
        .unwrap();
    assert_eq!(receipt.pending_reward, U256::ZERO);
    assert_eq!(h.pool.paid_to(&USER3), tokens(300));
    assert_eq!(h.pool.balance(), tokens(700));
}

#[test]
fn test_leaf_hash_matches_tree() {
    let h = Harness::new();
    let node = h.tree.get_node(&USER1).unwrap();
    assert_eq!(
        h.airdrop.calculate_leaf_hash(&USER1, tokens(100)),
        node.hash()
    );
}
