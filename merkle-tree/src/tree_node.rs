use std::str::FromStr;

use airdrop_merkle_verify::leaf_hash;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{csv_entry::CsvEntry, error::MerkleTreeError};

/// Decimals of the reward token; whitelist amounts are whole tokens.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Represents the claim information for an account.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Address of the claimant
    pub claimant: Address,
    /// Total amount the claimant is entitled to, in the token's smallest unit
    pub amount: U256,
    /// Claimant's proof of inclusion in the Merkle Tree
    pub proof: Option<Vec<[u8; 32]>>,
}

impl TreeNode {
    pub fn new(claimant: Address, amount: U256) -> Self {
        Self {
            claimant,
            amount,
            proof: None,
        }
    }

    pub fn hash(&self) -> [u8; 32] {
        leaf_hash(&self.claimant, self.amount)
    }

    /// Return amount for this claimant
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Parses a whitelist row. The address is accepted in any letter case and
    /// the amount is scaled from whole tokens by `10^decimals`.
    pub fn try_from_csv_entry(entry: &CsvEntry, decimals: u32) -> Result<Self, MerkleTreeError> {
        let claimant = Address::from_str(entry.address.trim())
            .map_err(|_| MerkleTreeError::InvalidAddress(entry.address.clone()))?;
        let ui_amount = U256::from_str_radix(entry.amount.trim(), 10)
            .map_err(|_| MerkleTreeError::InvalidAmount(entry.amount.clone()))?;

        Ok(Self::new(
            claimant,
            ui_amount_to_token_amount(ui_amount, decimals)?,
        ))
    }
}

/// Converts a ui amount to a token amount (with decimals)
pub fn ui_amount_to_token_amount(amount: U256, decimals: u32) -> Result<U256, MerkleTreeError> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|scale| amount.checked_mul(scale))
        .ok_or(MerkleTreeError::ArithmeticError)
}
