//! # Native Currency Boundary
//!
//! Native currency travels with the call itself. [`NativeCurrency`] is the
//! host chain's side of that: it settles the value attached to a call into
//! the ledger's custody account and pays out withdrawals.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::token::TransferError;
use crate::types::{Address, Amount};

/// Host-chain native balances, as seen by the ledger.
pub trait NativeCurrency: Send + Sync {
    /// Native balance of `account`.
    fn balance_of(&self, account: Address) -> Amount;

    /// Moves native value from `from` to `to`.
    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError>;
}

/// In-memory native balances for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryNative {
    balances: RwLock<HashMap<Address, Amount>>,
}

impl MemoryNative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `account` out of thin air, like a genesis allocation.
    pub fn fund(&self, account: Address, amount: Amount) -> Result<(), TransferError> {
        let mut balances = self.balances.write();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(account))?;
        Ok(())
    }
}

impl NativeCurrency for MemoryNative {
    fn balance_of(&self, account: Address) -> Amount {
        self.balances.read().get(&account).copied().unwrap_or(0)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError> {
        let mut balances = self.balances.write();
        let from_balance = balances.get(&from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(TransferError::InsufficientBalance {
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = balances
            .get(&to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;
        balances.insert(from, from_balance - amount);
        balances.insert(to, to_balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fund_and_transfer() {
        let native = MemoryNative::new();
        let alice = Address::derive("alice");
        let vault = Address::derive("vault");
        native.fund(alice, 10).unwrap();
        native.transfer(alice, vault, 4).unwrap();
        assert_eq!(native.balance_of(alice), 6);
        assert_eq!(native.balance_of(vault), 4);
    }

    #[test]
    fn overdraft_rejected() {
        let native = MemoryNative::new();
        let alice = Address::derive("alice");
        let err = native
            .transfer(alice, Address::derive("vault"), 1)
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance { .. }));
    }
}
