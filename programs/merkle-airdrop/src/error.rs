use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::custodian::CustodianError;

/// Error codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AirdropError {
    #[error("Campaign {0} not found")]
    NotFound(u64),
    #[error("Campaign not started: starts at {start_ts}, now {curr_ts}")]
    NotStarted { start_ts: i64, curr_ts: i64 },
    #[error("Campaign {0} is already active")]
    AlreadyActive(u64),
    #[error("Campaign {0} is not active")]
    NotActive(u64),
    /// Raised both before `start_ts` and after `end_ts`.
    #[error("Time expired")]
    TimeExpired {
        curr_ts: i64,
        start_ts: i64,
        end_ts: i64,
    },
    #[error("Invalid merkle proof")]
    InvalidProof,
    #[error("claim amount exceed pending reward")]
    ExceedsPending { requested: U256, pending: U256 },
    #[error("Reward transfer failed: {0}")]
    CustodianTransfer(CustodianError),
    #[error("Account {0} is not authorized to execute this instruction")]
    Unauthorized(Address),
    #[error("Start Timestamp cannot be after end Timestamp")]
    InvalidTimeWindow { start_ts: i64, end_ts: i64 },
    #[error("Total reward must be greater than zero")]
    ZeroTotalReward,
    #[error("Claim amount must be greater than zero")]
    ZeroClaimAmount,
    #[error("Exceeded campaign total reward")]
    ExceedsCampaignBudget { requested: U256, remaining: U256 },
    #[error("Total reward {total_reward} is below claimed reward {claimed_reward}")]
    InvalidTotalReward {
        total_reward: U256,
        claimed_reward: U256,
    },
    #[error("Arithmetic Error (overflow/underflow)")]
    ArithmeticError,
}

impl AirdropError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            AirdropError::NotFound(_) => "NOT_FOUND",
            AirdropError::NotStarted { .. } => "NOT_STARTED",
            AirdropError::AlreadyActive(_) => "ALREADY_ACTIVE",
            AirdropError::NotActive(_) => "NOT_ACTIVE",
            AirdropError::TimeExpired { .. } => "TIME_EXPIRED",
            AirdropError::InvalidProof => "INVALID_PROOF",
            AirdropError::ExceedsPending { .. } => "EXCEEDS_PENDING",
            AirdropError::CustodianTransfer(_) => "CUSTODIAN_TRANSFER",
            AirdropError::Unauthorized(_) => "UNAUTHORIZED",
            AirdropError::InvalidTimeWindow { .. } => "INVALID_TIME_WINDOW",
            AirdropError::ZeroTotalReward => "ZERO_TOTAL_REWARD",
            AirdropError::ZeroClaimAmount => "ZERO_CLAIM_AMOUNT",
            AirdropError::ExceedsCampaignBudget { .. } => "EXCEEDS_CAMPAIGN_BUDGET",
            AirdropError::InvalidTotalReward { .. } => "INVALID_TOTAL_REWARD",
            AirdropError::ArithmeticError => "ARITHMETIC_ERROR",
        }
    }

    /// Only a failed payout can succeed when retried with identical inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AirdropError::CustodianTransfer(_))
    }
}
