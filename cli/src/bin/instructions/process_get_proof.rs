use crate::*;

pub fn process_get_proof(get_proof_args: &GetProofArgs) -> Result<()> {
    let merkle_tree = AirdropMerkleTree::new_from_file(&get_proof_args.merkle_tree_path)?;
    let node = merkle_tree.get_node(&get_proof_args.address)?;

    println!("root: {}", B256::from(merkle_tree.merkle_root));
    println!("tree version: {}", merkle_tree.tree_version);
    println!("claimant: {}", node.claimant);
    println!("amount: {}", node.amount);
    println!("leaf: {}", B256::from(node.hash()));

    let proof: Vec<String> = node
        .proof
        .unwrap_or_default()
        .into_iter()
        .map(|p| B256::from(p).to_string())
        .collect();
    println!("proof: {}", proof.join(","));

    Ok(())
}
