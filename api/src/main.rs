mod error;
mod router;

use std::{fmt::Debug, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use airdrop_merkle_tree::airdrop_merkle_tree::AirdropMerkleTree;
use alloy_primitives::{Address, U256};
use clap::Parser;
use merkle_airdrop::{
    authority::AdminSet,
    clock::{Clock, SystemClock},
    custodian::InMemoryRewardPool,
    error::AirdropError,
    state::events::TracingEventSink,
    MerkleAirdrop, NewCampaignArgs,
};
use router::RouterState;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ApiError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Bind address for the server
    #[clap(long, env, default_value = "0.0.0.0:7001")]
    bind_addr: SocketAddr,

    /// Path of merkle tree
    #[clap(long, env)]
    merkle_tree_path: PathBuf,

    /// Admin allowed to manage the campaign
    #[clap(long, env)]
    admin: Address,

    /// Tokens held by the reward pool at startup, in base units
    #[clap(long, env)]
    pool_balance: U256,

    /// Campaign name
    #[clap(long, env, default_value = "airdrop")]
    name: String,

    /// Campaign budget in base units, defaults to the tree's total
    #[clap(long, env)]
    total_reward: Option<U256>,

    /// Claim window start (Unix Timestamp)
    #[clap(long, env)]
    start_ts: i64,

    /// Claim window end (Unix Timestamp)
    #[clap(long, env)]
    end_ts: i64,

    #[clap(long, env)]
    enable_proof_endpoint: bool,
}

#[tokio::main]
#[instrument]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("args: {:?}", args);

    let tree = AirdropMerkleTree::new_from_file(&args.merkle_tree_path)?;
    info!(
        "loaded merkle tree version {} with {} nodes",
        tree.tree_version, tree.max_num_nodes
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let airdrop = Arc::new(MerkleAirdrop::new(
        Arc::new(AdminSet::new([args.admin])),
        Arc::new(InMemoryRewardPool::new(args.pool_balance)),
        Arc::new(TracingEventSink),
        clock.clone(),
    ));

    let campaign_id = airdrop.create_campaign(
        &args.admin,
        NewCampaignArgs {
            name: args.name.clone(),
            merkle_root: tree.merkle_root,
            total_reward: args.total_reward.unwrap_or(tree.max_total_claim),
            start_ts: args.start_ts,
            end_ts: args.end_ts,
            tree_version: tree.tree_version,
        },
    )?;
    if airdrop.pool_balance() < tree.max_total_claim {
        warn!(
            "pool balance {} does not cover the tree total {}",
            airdrop.pool_balance(),
            tree.max_total_claim
        );
    }

    tokio::spawn(activate_when_started(
        airdrop.clone(),
        clock.clone(),
        args.admin,
        campaign_id,
        args.start_ts,
    ));

    let state = Arc::new(RouterState {
        airdrop,
        campaign_id,
        clock,
        tree: tree.convert_to_hashmap(),
    });

    let app = router::get_routes(state, args.enable_proof_endpoint);

    info!("starting server at {}", args.bind_addr);
    axum::Server::bind(&args.bind_addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Opens the campaign for claims as soon as its start time is reached.
async fn activate_when_started(
    airdrop: Arc<MerkleAirdrop>,
    clock: Arc<dyn Clock>,
    admin: Address,
    campaign_id: u64,
    start_ts: i64,
) {
    let wait = start_ts.saturating_sub(clock.unix_timestamp());
    if wait > 0 {
        info!("campaign {} opens in {}s", campaign_id, wait);
        tokio::time::sleep(Duration::from_secs(wait as u64)).await;
    }

    loop {
        match airdrop.activate_campaign(&admin, campaign_id) {
            Ok(()) | Err(AirdropError::AlreadyActive(_)) => return,
            // the system clock may lag behind the sleep by a moment
            Err(AirdropError::NotStarted { .. }) => {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                warn!("failed to activate campaign {}: {}", campaign_id, e);
                return;
            }
        }
    }
}
