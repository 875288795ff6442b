//! The reward pool that actually holds the tokens. The ledger only asks it to
//! pay; settlement itself lives outside this crate.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, PoisonError},
};

use alloy_primitives::{keccak256, Address, U256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodianError {
    #[error("Insufficient pool balance: balance {balance}, requested {requested}")]
    InsufficientBalance { balance: U256, requested: U256 },
    #[error("Transfer timed out")]
    Timeout,
    #[error("Custodian unavailable: {0}")]
    Unavailable(String),
}

impl CustodianError {
    /// Whether funds may have moved despite the error. Only an insufficient
    /// balance is known to leave the pool untouched.
    pub fn may_have_settled(&self) -> bool {
        !matches!(self, CustodianError::InsufficientBalance { .. })
    }
}

/// One payout, identified by a key derived from the ledger state it was
/// computed from. Retrying the same claim from the same state yields the same
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRequest {
    pub idempotency_key: [u8; 32],
    pub campaign_id: u64,
    pub recipient: Address,
    pub amount: U256,
}

impl PayoutRequest {
    pub fn new(campaign_id: u64, recipient: Address, claimed_before: U256, amount: U256) -> Self {
        let mut packed = Vec::with_capacity(8 + 20 + 32 + 32);
        packed.extend_from_slice(&campaign_id.to_be_bytes());
        packed.extend_from_slice(recipient.as_slice());
        packed.extend_from_slice(&claimed_before.to_be_bytes::<32>());
        packed.extend_from_slice(&amount.to_be_bytes::<32>());

        Self {
            idempotency_key: keccak256(&packed).0,
            campaign_id,
            recipient,
            amount,
        }
    }
}

pub trait RewardCustodian: Send + Sync {
    /// Pays `request.amount` to `request.recipient`. Must either fully settle
    /// or fail without moving funds. A request whose key was already settled
    /// reports success without paying again.
    fn transfer_to(&self, request: &PayoutRequest) -> Result<(), CustodianError>;

    fn balance(&self) -> U256;
}

#[derive(Debug, Default)]
struct PoolState {
    balance: U256,
    settled: HashSet<[u8; 32]>,
    paid: HashMap<Address, U256>,
}

/// Reward pool kept in memory. Useful for tests and for services that settle
/// balances out of band.
#[derive(Debug, Default)]
pub struct InMemoryRewardPool {
    state: Mutex<PoolState>,
}

impl InMemoryRewardPool {
    pub fn new(balance: U256) -> Self {
        Self {
            state: Mutex::new(PoolState {
                balance,
                ..PoolState::default()
            }),
        }
    }

    pub fn deposit(&self, amount: U256) -> Result<U256, CustodianError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.balance = state
            .balance
            .checked_add(amount)
            .ok_or_else(|| CustodianError::Unavailable("balance overflow".to_string()))?;
        Ok(state.balance)
    }

    /// Total paid out to `recipient` across all campaigns.
    pub fn paid_to(&self, recipient: &Address) -> U256 {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.paid.get(recipient).copied().unwrap_or_default()
    }
}

impl RewardCustodian for InMemoryRewardPool {
    fn transfer_to(&self, request: &PayoutRequest) -> Result<(), CustodianError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.settled.contains(&request.idempotency_key) {
            debug!(
                "payout to {} of {} already settled",
                request.recipient, request.amount
            );
            return Ok(());
        }

        let Some(balance) = state.balance.checked_sub(request.amount) else {
            warn!(
                "pool balance {} cannot cover payout of {}",
                state.balance, request.amount
            );
            return Err(CustodianError::InsufficientBalance {
                balance: state.balance,
                requested: request.amount,
            });
        };

        state.balance = balance;
        state.settled.insert(request.idempotency_key);
        *state.paid.entry(request.recipient).or_default() += request.amount;
        Ok(())
    }

    fn balance(&self) -> U256 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .balance
    }
}
