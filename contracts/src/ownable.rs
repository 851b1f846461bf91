//! # Access Control
//!
//! A single owner account. Privileged operations call
//! [`Ownable::ensure_owner`] before touching any state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hydro_protocol::Address;

/// Errors raised by the owner gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The caller is not the owner.
    #[error("caller {caller} is not the owner")]
    NotOwner {
        /// Account that attempted the privileged call.
        caller: Address,
    },

    /// Ownership cannot be handed to the zero address.
    #[error("new owner must not be the zero address")]
    InvalidOwner,
}

/// Single-owner permission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, account: Address) -> bool {
        account == self.owner
    }

    /// Fails with [`AccessError::NotOwner`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), AccessError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(AccessError::NotOwner { caller })
        }
    }

    /// Hands ownership to `new_owner`. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, AccessError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::InvalidOwner);
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        tracing::info!(%previous, %new_owner, "ownership transferred");
        Ok(previous)
    }
}
