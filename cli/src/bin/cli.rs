extern crate airdrop_merkle_tree;
extern crate merkle_airdrop;

mod instructions;

use std::path::PathBuf;

use airdrop_merkle_tree::{
    airdrop_merkle_tree::AirdropMerkleTree, csv_entry::CsvEntry, tree_node::DEFAULT_DECIMALS,
};
use alloy_primitives::{Address, B256, U256};
use anyhow::Result;
use clap::{Parser, Subcommand};
use instructions::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a Merkle tree, given a CSV of recipients
    CreateMerkleTree(CreateMerkleTreeArgs),
    /// Print the proof of a claimant
    GetProof(GetProofArgs),
    /// Verify a proof against a root, without the tree
    VerifyProof(VerifyProofArgs),
    CreateDummyCsv(CreateDummyCsv),
    /// Run claims against an in-memory campaign built from a tree
    SimulateClaim(SimulateClaimArgs),
}

#[derive(Parser, Debug)]
pub struct CreateMerkleTreeArgs {
    /// CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,

    /// Merkle tree out path. A directory when splitting into several trees
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,

    /// Decimals of the distributed token
    #[clap(long, env, default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,

    /// Version of the whitelist, increment on every rotation
    #[clap(long, env, default_value_t = 0)]
    pub tree_version: u64,

    /// Sum the amounts of addresses listed more than once
    #[clap(long, env)]
    pub merge_duplicates: bool,

    /// max nodes per tree
    #[clap(long, env)]
    pub max_nodes_per_tree: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct GetProofArgs {
    /// Merkle tree path
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,

    #[clap(long, env)]
    pub address: Address,
}

#[derive(Parser, Debug)]
pub struct VerifyProofArgs {
    #[clap(long, env)]
    pub root: B256,

    #[clap(long, env)]
    pub address: Address,

    /// Entitlement in base units
    #[clap(long, env)]
    pub amount: U256,

    /// Comma separated sibling hashes, leaf to root
    #[clap(long, env, value_delimiter = ',')]
    pub proof: Vec<B256>,
}

#[derive(Parser, Debug)]
pub struct CreateDummyCsv {
    /// CSV path
    #[clap(long, env)]
    pub csv_path: PathBuf,

    #[clap(long, env)]
    pub num_records: u64,

    /// Amount per record, in whole tokens
    #[clap(long, env)]
    pub amount: u64,
}

#[derive(Parser, Debug)]
pub struct SimulateClaimArgs {
    /// Merkle tree path
    #[clap(long, env)]
    pub merkle_tree_path: PathBuf,

    /// Only claim for this address
    #[clap(long, env)]
    pub address: Option<Address>,

    /// Amount per claim in base units, defaults to the full entitlement
    #[clap(long, env)]
    pub amount: Option<U256>,

    /// Number of claims per claimant
    #[clap(long, env, default_value_t = 1)]
    pub repeat: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match &args.command {
        Commands::CreateMerkleTree(merkle_tree_args) => {
            process_create_merkle_tree(merkle_tree_args)?;
        }
        Commands::GetProof(get_proof_args) => {
            process_get_proof(get_proof_args)?;
        }
        Commands::VerifyProof(verify_proof_args) => {
            process_verify_proof(verify_proof_args)?;
        }
        Commands::CreateDummyCsv(dummy_csv_args) => {
            process_create_dummy_csv(dummy_csv_args)?;
        }
        Commands::SimulateClaim(simulate_claim_args) => {
            process_simulate_claim(simulate_claim_args)?;
        }
    }

    Ok(())
}
