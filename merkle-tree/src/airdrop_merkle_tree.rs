use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Write},
    path::Path,
    result,
};

use airdrop_merkle_verify::verify;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    csv_entry::CsvEntry,
    error::{MerkleTreeError, MerkleTreeError::MerkleValidationError},
    merkle_tree::{build_tree, MerkleTree},
    tree_node::TreeNode,
    utils::get_max_total_claim,
};

/// Merkle Tree which will be used to distribute tokens to claimants.
/// Contains all the information necessary to verify claims against the Merkle Tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropMerkleTree {
    /// The merkle root, which is registered with a campaign
    pub merkle_root: [u8; 32],
    /// Version of the whitelist this tree was built from
    pub tree_version: u64,
    pub max_num_nodes: u64,
    pub max_total_claim: U256,
    /// Nodes in leaf order, each carrying its proof
    pub tree_nodes: Vec<TreeNode>,
}

pub type Result<T> = result::Result<T, MerkleTreeError>;

impl AirdropMerkleTree {
    pub fn new(tree_nodes: Vec<TreeNode>, tree_version: u64) -> Result<Self> {
        let (merkle_root, tree) = build_tree(&tree_nodes)?;

        // Store nodes in leaf order so the file is identical for any input order
        let mut tree_nodes: Vec<TreeNode> = tree_nodes;
        tree_nodes.sort_by_key(TreeNode::hash);

        for (i, tree_node) in tree_nodes.iter_mut().enumerate() {
            tree_node.proof = Some(
                tree.find_proof(i)
                    .ok_or_else(|| MerkleValidationError(format!("no proof for leaf {i}")))?,
            );
        }

        let max_total_claim = get_max_total_claim(&tree_nodes)?;
        let tree = AirdropMerkleTree {
            merkle_root,
            tree_version,
            max_num_nodes: tree_nodes.len() as u64,
            max_total_claim,
            tree_nodes,
        };

        info!(
            "created merkle tree version {} with {} nodes and max total claim of {}",
            tree.tree_version, tree.max_num_nodes, tree.max_total_claim
        );
        tree.validate()?;
        Ok(tree)
    }

    /// Load a merkle tree from a csv path, scaling amounts by `10^decimals`
    pub fn new_from_csv(path: &Path, decimals: u32, tree_version: u64) -> Result<Self> {
        let csv_entries = CsvEntry::new_from_file(path)?;
        Self::new_from_entries(&csv_entries, decimals, tree_version)
    }

    pub fn new_from_entries(
        csv_entries: &[CsvEntry],
        decimals: u32,
        tree_version: u64,
    ) -> Result<Self> {
        let tree_nodes = csv_entries
            .iter()
            .map(|entry| TreeNode::try_from_csv_entry(entry, decimals))
            .collect::<Result<Vec<_>>>()?;
        Self::new(tree_nodes, tree_version)
    }

    /// Load a serialized merkle tree from file path
    pub fn new_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let tree: AirdropMerkleTree = serde_json::from_reader(reader)?;
        tree.validate()?;

        Ok(tree)
    }

    /// Write a merkle tree to a filepath
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    /// First node of `claimant`. A claimant listed with several amounts has
    /// one node per amount.
    pub fn get_node(&self, claimant: &Address) -> Result<TreeNode> {
        self.tree_nodes
            .iter()
            .find(|n| n.claimant == *claimant)
            .cloned()
            .ok_or(MerkleTreeError::ClaimantNotFound(*claimant))
    }

    fn validate(&self) -> Result<()> {
        // The Merkle tree can be at most height 32, implying a max node count of 2^32 - 1
        if self.max_num_nodes > 2u64.pow(32) - 1 {
            return Err(MerkleValidationError(format!(
                "Max num nodes {} is greater than 2^32 - 1",
                self.max_num_nodes
            )));
        }

        // validate that the length is equal to the max_num_nodes
        if self.tree_nodes.len() != self.max_num_nodes as usize {
            return Err(MerkleValidationError(format!(
                "Tree nodes length {} does not match max_num_nodes {}",
                self.tree_nodes.len(),
                self.max_num_nodes
            )));
        }

        // validate that sum is equal to max_total_claim
        let sum = get_max_total_claim(&self.tree_nodes)?;

        if sum != self.max_total_claim {
            return Err(MerkleValidationError(format!(
                "Tree nodes sum {} does not match max_total_claim {}",
                sum, self.max_total_claim
            )));
        }

        self.verify_proof()
    }

    /// verify that the leaves of the merkle tree match the nodes
    pub fn verify_proof(&self) -> Result<()> {
        let root = self.merkle_root;

        // Recreate root given nodes
        let hashed_nodes: Vec<[u8; 32]> = self.tree_nodes.iter().map(TreeNode::hash).collect();
        let mk = MerkleTree::new(&hashed_nodes);

        if mk.get_root().ok_or(MerkleTreeError::MerkleRootError)? != root {
            return Err(MerkleValidationError(
                "Merkle root is invalid given nodes".to_string(),
            ));
        }

        // Verify each node against the root, using the proof stored with it
        for node in self.tree_nodes.iter() {
            let proof = node.proof.as_deref().unwrap_or_default();
            if !verify(proof, root, node.hash()) {
                return Err(MerkleValidationError(format!(
                    "invalid merkle proof for {}",
                    node.claimant
                )));
            }
        }

        Ok(())
    }

    // Converts Merkle Tree to a map for faster key access
    /// Nodes keyed by claimant. Like `get_node`, the first node of an
    /// address listed with several amounts wins.
    pub fn convert_to_hashmap(&self) -> HashMap<Address, TreeNode> {
        let mut nodes = HashMap::with_capacity(self.tree_nodes.len());
        for node in &self.tree_nodes {
            nodes.entry(node.claimant).or_insert_with(|| node.clone());
        }
        nodes
    }
}
