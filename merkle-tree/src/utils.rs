use alloy_primitives::{Address, U256};
use indexmap::IndexMap;
use tracing::warn;

use crate::{error::MerkleTreeError, tree_node::TreeNode};

/// Given a set of tree nodes, get the max total claim amount.
pub fn get_max_total_claim(nodes: &[TreeNode]) -> Result<U256, MerkleTreeError> {
    nodes
        .iter()
        .try_fold(U256::ZERO, |acc, n| acc.checked_add(n.amount()))
        .ok_or(MerkleTreeError::ArithmeticError)
}

/// Combine tree nodes with the same claimant, while retaining original order
pub fn merge_duplicate_claimants(tree_nodes: Vec<TreeNode>) -> Result<Vec<TreeNode>, MerkleTreeError> {
    let mut tree_nodes_map: IndexMap<Address, TreeNode> = IndexMap::new();
    for tree_node in tree_nodes {
        match tree_nodes_map.get_mut(&tree_node.claimant) {
            Some(existing) => {
                warn!("duplicate claimant {} found, combining", existing.claimant);
                existing.amount = existing
                    .amount
                    .checked_add(tree_node.amount)
                    .ok_or(MerkleTreeError::ArithmeticError)?;
            }
            None => {
                tree_nodes_map.insert(tree_node.claimant, tree_node);
            }
        }
    }

    Ok(tree_nodes_map.into_values().collect())
}
