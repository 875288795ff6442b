use std::fs;

use airdrop_merkle_tree::{tree_node::TreeNode, utils::merge_duplicate_claimants};
use anyhow::{bail, Context};

use crate::*;

pub fn process_create_merkle_tree(merkle_tree_args: &CreateMerkleTreeArgs) -> Result<()> {
    let csv_entries = CsvEntry::new_from_file(&merkle_tree_args.csv_path)
        .with_context(|| format!("failed to read {}", merkle_tree_args.csv_path.display()))?;

    let mut tree_nodes = csv_entries
        .iter()
        .map(|entry| TreeNode::try_from_csv_entry(entry, merkle_tree_args.decimals))
        .collect::<Result<Vec<_>, _>>()?;

    if merkle_tree_args.merge_duplicates {
        let before = tree_nodes.len();
        tree_nodes = merge_duplicate_claimants(tree_nodes)?;
        println!("merged duplicates from {} to {} nodes", before, tree_nodes.len());
    }

    let Some(max_nodes_per_tree) = merkle_tree_args.max_nodes_per_tree else {
        let merkle_tree = AirdropMerkleTree::new(tree_nodes, merkle_tree_args.tree_version)?;
        merkle_tree.write_to_file(&merkle_tree_args.merkle_tree_path)?;
        print_tree_summary(&merkle_tree, &merkle_tree_args.merkle_tree_path);
        return Ok(());
    };

    if max_nodes_per_tree == 0 {
        bail!("max nodes per tree must be greater than zero");
    }

    let base_path = &merkle_tree_args.merkle_tree_path;
    fs::create_dir_all(base_path)?;

    // one version per sub tree, counting up from the given one
    for (index, sub_tree) in tree_nodes.chunks(max_nodes_per_tree as usize).enumerate() {
        let tree_version = merkle_tree_args.tree_version + index as u64;
        let merkle_tree = AirdropMerkleTree::new(sub_tree.to_vec(), tree_version)?;

        let path = base_path.join(format!("tree_{}.json", tree_version));
        merkle_tree.write_to_file(&path)?;
        print_tree_summary(&merkle_tree, &path);
    }

    Ok(())
}

fn print_tree_summary(merkle_tree: &AirdropMerkleTree, path: &std::path::Path) {
    println!(
        "wrote tree version {} to {}: root {}, {} nodes, max total claim {}",
        merkle_tree.tree_version,
        path.display(),
        B256::from(merkle_tree.merkle_root),
        merkle_tree.max_num_nodes,
        merkle_tree.max_total_claim
    );
}
