use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use airdrop_merkle_tree::tree_node::TreeNode;
use alloy_primitives::{Address, B256, U256};
use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use http::Request;
use merkle_airdrop::{
    clock::Clock,
    state::{campaign::CampaignInfo, user_reward::UserRewardStatus},
    MerkleAirdrop,
};
use serde_derive::{Deserialize, Serialize};
use tower::{
    buffer::BufferLayer, limit::RateLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer,
    ServiceBuilder,
};
use tower_http::{
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{info, instrument, Span};

use crate::{error, error::ApiError, Result};

pub struct RouterState {
    pub airdrop: Arc<MerkleAirdrop>,
    /// Campaign served by this instance
    pub campaign_id: u64,
    pub clock: Arc<dyn Clock>,
    pub tree: HashMap<Address, TreeNode>,
}

impl Debug for RouterState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterState")
            .field("campaign_id", &self.campaign_id)
            .field("tree", &self.tree.len())
            .finish()
    }
}

#[instrument]
pub fn get_routes(state: Arc<RouterState>, enable_proof_endpoint: bool) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(error::handle_error)) // handle middleware errors explicitly!
        .layer(BufferLayer::new(100)) // buffer up to 100 requests in queue
        .layer(RateLimitLayer::new(1000, Duration::from_secs(10)))
        .layer(TimeoutLayer::new(Duration::from_secs(20)))
        .layer(LoadShedLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started {} {}", request.method(), request.uri().path())
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(tracing_core::Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/users", get(get_users))
        .route("/campaign", get(get_campaign))
        .route("/status/:address", get(get_status))
        .route("/version", get(get_version))
        .route("/claim", post(claim));

    // don't enable until the campaign starts
    if enable_proof_endpoint {
        router = router.route("/proof/:address", get(get_proof));
    }

    router.layer(middleware).with_state(state)
}

fn parse_address(address: &str) -> Result<Address> {
    Address::from_str(address).map_err(|e| ApiError::ParseAddressError(e.to_string()))
}

/// Retrieve the proof for a given user
#[instrument(ret)]
async fn get_proof(
    State(state): State<Arc<RouterState>>,
    Path(address): Path<String>,
) -> Result<Json<Proof>> {
    let address = parse_address(&address)?;
    let node = state
        .tree
        .get(&address)
        .ok_or_else(|| ApiError::UserNotFound(address.to_string()))?;

    let proof = Proof {
        amount: node.amount,
        proof: node
            .proof
            .as_ref()
            .ok_or_else(|| ApiError::ProofNotFound(address.to_string()))?
            .iter()
            .copied()
            .map(B256::from)
            .collect(),
    };

    Ok(Json(proof))
}

#[instrument(ret)]
async fn get_users(State(state): State<Arc<RouterState>>) -> Result<Json<Vec<String>>> {
    let mut users: Vec<String> = state.tree.keys().map(|key| key.to_string()).collect();
    users.sort();

    Ok(Json(users))
}

#[instrument(ret)]
async fn get_campaign(State(state): State<Arc<RouterState>>) -> Result<Json<CampaignInfo>> {
    Ok(Json(state.airdrop.get_campaign(state.campaign_id)?))
}

#[instrument(ret)]
async fn get_status(
    State(state): State<Arc<RouterState>>,
    Path(address): Path<String>,
) -> Result<Json<ClaimStatus>> {
    let address = parse_address(&address)?;
    let record = state.airdrop.get_user_status(state.campaign_id, &address)?;
    let entitlement = match state.tree.get(&address) {
        Some(node) => node.amount,
        // an admin may have granted an entitlement outside of the tree
        None if record.has_record => record.total_reward,
        None => return Err(ApiError::UserNotFound(address.to_string())),
    };

    let campaign = state.airdrop.get_campaign(state.campaign_id)?;
    let expired = state.clock.unix_timestamp() > campaign.end_ts;

    Ok(Json(ClaimStatus::new(entitlement, record, expired)))
}

/// Gets the version of the whitelist the campaign currently proves against
#[instrument(ret)]
async fn get_version(State(state): State<Arc<RouterState>>) -> Result<Json<u64>> {
    Ok(Json(
        state.airdrop.get_campaign(state.campaign_id)?.tree_version,
    ))
}

/// Claims for `claimant`. Entitlement and proof default to the ones in the
/// served tree.
#[instrument(ret)]
async fn claim(
    State(state): State<Arc<RouterState>>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>> {
    let node = state.tree.get(&request.claimant);

    let total_reward = request
        .total_reward
        .or_else(|| node.map(|n| n.amount))
        .unwrap_or_default();
    let proof: Vec<[u8; 32]> = match request.proof {
        Some(proof) => proof.into_iter().map(|p| p.0).collect(),
        None => node.and_then(|n| n.proof.clone()).unwrap_or_default(),
    };

    let receipt = state.airdrop.claim(
        state.campaign_id,
        &request.claimant,
        request.claim_amount,
        total_reward,
        &proof,
    )?;

    Ok(Json(ClaimResponse {
        claimant: request.claimant,
        claim_amount: request.claim_amount,
        claimed_reward: receipt.claimed_reward,
        pending_reward: receipt.pending_reward,
    }))
}

async fn root() -> impl IntoResponse {
    "Merkle Airdrop API"
}

#[derive(Serialize, Deserialize, Debug)]
struct Proof {
    pub amount: U256,
    pub proof: Vec<B256>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unclaimed,        // User has not claimed anything yet
    PartiallyClaimed, // User claimed part of their entitlement
    Claimed,          // User claimed everything
    Expired,          // claim period is over
}

#[derive(Serialize, Deserialize, Debug)]
struct ClaimStatus {
    pub status: Status,
    pub total_reward: U256,
    pub claimed_reward: U256,
    pub pending_reward: U256,
}

impl ClaimStatus {
    fn new(entitlement: U256, record: UserRewardStatus, expired: bool) -> Self {
        if !record.has_record {
            return Self {
                status: if expired {
                    Status::Expired
                } else {
                    Status::Unclaimed
                },
                total_reward: entitlement,
                claimed_reward: U256::ZERO,
                pending_reward: entitlement,
            };
        }

        let status = if record.pending_reward == U256::ZERO {
            Status::Claimed
        } else if expired {
            Status::Expired
        } else {
            Status::PartiallyClaimed
        };

        // the recorded entitlement wins over the tree once the user claimed
        Self {
            status,
            total_reward: record.total_reward,
            claimed_reward: record.claimed_reward,
            pending_reward: record.pending_reward,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ClaimRequest {
    pub claimant: Address,
    pub claim_amount: U256,
    #[serde(default)]
    pub total_reward: Option<U256>,
    #[serde(default)]
    pub proof: Option<Vec<B256>>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ClaimResponse {
    pub claimant: Address,
    pub claim_amount: U256,
    pub claimed_reward: U256,
    pub pending_reward: U256,
}
