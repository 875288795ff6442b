use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MerkleTreeError {
    #[error("Cannot build a merkle tree from an empty whitelist")]
    EmptyInput,
    #[error("Duplicate leaf for claimant {claimant} with amount {amount}")]
    DuplicateLeaf { claimant: Address, amount: U256 },
    #[error("Merkle Tree Validation Error: {0}")]
    MerkleValidationError(String),
    #[error("Merkle Root Error")]
    MerkleRootError,
    #[error("Claimant {0} not found in tree")]
    ClaimantNotFound(Address),
    #[error("Invalid address {0}")]
    InvalidAddress(String),
    #[error("Invalid amount {0}")]
    InvalidAmount(String),
    #[error("Arithmetic Error (overflow)")]
    ArithmeticError,
    #[error("io Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serde Error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Csv Error: {0}")]
    CsvError(#[from] csv::Error),
}
