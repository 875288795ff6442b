use std::{collections::HashSet, result};

use airdrop_merkle_verify::{hash_pair, leaf_hash, verify_claim};
use alloy_primitives::{Address, U256};

use crate::{error::MerkleTreeError, tree_node::TreeNode};

pub type Result<T> = result::Result<T, MerkleTreeError>;

/// Merkle tree whose leaves are sorted before pairing and whose sibling pairs
/// are sorted before hashing. The root only depends on the multiset of leaves.
///
/// A node without a sibling is carried up to the next level unchanged, so it
/// contributes no element to the proofs passing through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` holds the sorted leaves, the last level holds the root.
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn new(leaves: &[[u8; 32]]) -> Self {
        let mut sorted = leaves.to_vec();
        sorted.sort_unstable();

        let mut levels = vec![sorted];
        loop {
            let next: Vec<[u8; 32]> = match levels.last() {
                Some(level) if level.len() > 1 => level
                    .chunks(2)
                    .map(|pair| match pair {
                        [left, right] => hash_pair(left, right),
                        _ => pair[0],
                    })
                    .collect(),
                _ => break,
            };
            levels.push(next);
        }

        MerkleTree { levels }
    }

    pub fn get_root(&self) -> Option<[u8; 32]> {
        self.levels.last().and_then(|level| level.first()).copied()
    }

    /// Leaves in the order they sit at the bottom of the tree.
    pub fn leaves(&self) -> &[[u8; 32]] {
        &self.levels[0]
    }

    pub fn leaf_index(&self, leaf: &[u8; 32]) -> Option<usize> {
        self.leaves().binary_search(leaf).ok()
    }

    /// Sibling path from the leaf at `index` up to (excluding) the root.
    pub fn find_proof(&self, index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.leaves().len() {
            return None;
        }

        let mut proof = Vec::with_capacity(self.levels.len());
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(position ^ 1) {
                proof.push(*sibling);
            }
            position /= 2;
        }
        Some(proof)
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

/// Builds the commitment for a whitelist.
///
/// The same claimant may appear with different amounts; an identical
/// `(claimant, amount)` pair appearing twice is rejected since both copies
/// would share one leaf.
pub fn build_tree(entries: &[TreeNode]) -> Result<([u8; 32], MerkleTree)> {
    if entries.is_empty() {
        return Err(MerkleTreeError::EmptyInput);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert((entry.claimant, entry.amount)) {
            return Err(MerkleTreeError::DuplicateLeaf {
                claimant: entry.claimant,
                amount: entry.amount,
            });
        }
    }

    let hashed_nodes: Vec<[u8; 32]> = entries.iter().map(TreeNode::hash).collect();
    let tree = MerkleTree::new(&hashed_nodes);
    let root = tree.get_root().ok_or(MerkleTreeError::MerkleRootError)?;

    Ok((root, tree))
}

/// Proof for `(claimant, amount)`, or `None` when that leaf is not in the tree.
pub fn get_proof(tree: &MerkleTree, claimant: &Address, amount: U256) -> Option<Vec<[u8; 32]>> {
    tree.leaf_index(&leaf_hash(claimant, amount))
        .and_then(|index| tree.find_proof(index))
}

/// Verifies a proof without access to the tree.
pub fn verify_proof(root: [u8; 32], claimant: &Address, amount: U256, proof: &[[u8; 32]]) -> bool {
    verify_claim(proof, root, claimant, amount)
}
