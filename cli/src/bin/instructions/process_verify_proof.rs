use airdrop_merkle_verify::{leaf_hash, verify};
use anyhow::bail;

use crate::*;

pub fn process_verify_proof(verify_proof_args: &VerifyProofArgs) -> Result<()> {
    let leaf = leaf_hash(&verify_proof_args.address, verify_proof_args.amount);
    let proof: Vec<[u8; 32]> = verify_proof_args.proof.iter().map(|p| p.0).collect();

    if !verify(&proof, verify_proof_args.root.0, leaf) {
        bail!(
            "invalid proof for {} with amount {} against root {}",
            verify_proof_args.address,
            verify_proof_args.amount,
            verify_proof_args.root
        );
    }

    println!(
        "valid proof for {} with amount {} (leaf {})",
        verify_proof_args.address,
        verify_proof_args.amount,
        B256::from(leaf)
    );
    Ok(())
}
