use alloy_primitives::{keccak256, Address, U256};

/// Hash of a whitelist entry: `keccak256(address || amount)`, with the amount
/// encoded as 32 big-endian bytes. Matches `abi.encodePacked(address, uint256)`.
pub fn leaf_hash(claimant: &Address, amount: U256) -> [u8; 32] {
    let mut packed = [0u8; 52];
    packed[..20].copy_from_slice(claimant.as_slice());
    packed[20..].copy_from_slice(&amount.to_be_bytes::<32>());
    keccak256(packed).0
}

/// Hash of two sibling nodes. The pair is sorted first, so callers never need
/// to know which side a sibling sits on.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut packed = [0u8; 64];
    packed[..32].copy_from_slice(lo);
    packed[32..].copy_from_slice(hi);
    keccak256(packed).0
}

/// Adapted from OpenZeppelin's `MerkleProof.verify`.
/// Returns true if a `leaf` can be proved to be a part of a Merkle tree
/// defined by `root`. For this, a `proof` must be provided, containing
/// sibling hashes on the branch from the leaf to the root of the tree. Each
/// pair of leaves and each pair of pre-images are assumed to be sorted.
pub fn verify(proof: &[[u8; 32]], root: [u8; 32], leaf: [u8; 32]) -> bool {
    let computed_hash = proof
        .iter()
        .fold(leaf, |computed_hash, proof_element| {
            hash_pair(&computed_hash, proof_element)
        });
    computed_hash == root
}

/// Convenience wrapper that hashes `(claimant, amount)` before verifying.
pub fn verify_claim(proof: &[[u8; 32]], root: [u8; 32], claimant: &Address, amount: U256) -> bool {
    verify(proof, root, leaf_hash(claimant, amount))
}
