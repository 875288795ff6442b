use std::{
    collections::HashSet,
    sync::{PoisonError, RwLock},
};

use alloy_primitives::Address;
use tracing::info;

use crate::error::AirdropError;

/// Decides who may create, activate and rotate campaigns.
pub trait Authority: Send + Sync {
    fn is_admin(&self, caller: &Address) -> bool;
}

/// Role set of admin addresses. Only an admin can grant or revoke the role.
#[derive(Debug, Default)]
pub struct AdminSet {
    admins: RwLock<HashSet<Address>>,
}

impl AdminSet {
    pub fn new(admins: impl IntoIterator<Item = Address>) -> Self {
        Self {
            admins: RwLock::new(admins.into_iter().collect()),
        }
    }

    pub fn grant_admin(&self, caller: &Address, new_admin: Address) -> Result<(), AirdropError> {
        let mut admins = self.admins.write().unwrap_or_else(PoisonError::into_inner);
        if !admins.contains(caller) {
            return Err(AirdropError::Unauthorized(*caller));
        }
        if admins.insert(new_admin) {
            info!("{} granted admin role to {}", caller, new_admin);
        }
        Ok(())
    }

    pub fn revoke_admin(&self, caller: &Address, admin: &Address) -> Result<(), AirdropError> {
        let mut admins = self.admins.write().unwrap_or_else(PoisonError::into_inner);
        if !admins.contains(caller) {
            return Err(AirdropError::Unauthorized(*caller));
        }
        if admins.remove(admin) {
            info!("{} revoked admin role from {}", caller, admin);
        }
        Ok(())
    }
}

impl Authority for AdminSet {
    fn is_admin(&self, caller: &Address) -> bool {
        self.admins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(caller)
    }
}
