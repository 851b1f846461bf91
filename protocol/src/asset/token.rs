//! # Token Contract Boundary
//!
//! The settlement core never implements a token. It talks to token
//! contracts through [`TokenContract`], the ERC20 subset it actually needs:
//! balances, allowances, `transfer` and `transfer_from`.
//!
//! [`MemoryToken`] is a reference implementation backed by a lock-protected
//! map. Tests, benches and local demos use it in place of a deployed token.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::types::{Address, Amount};

/// Reasons a token or native transfer is refused by the external side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The source account does not hold enough.
    #[error("insufficient balance: has {balance}, needs {amount}")]
    InsufficientBalance {
        /// Current balance of the source.
        balance: Amount,
        /// Amount requested.
        amount: Amount,
    },

    /// The spender has not been approved for enough.
    #[error("insufficient allowance: approved {allowance}, needs {amount}")]
    InsufficientAllowance {
        /// Current allowance.
        allowance: Amount,
        /// Amount requested.
        amount: Amount,
    },

    /// Crediting the recipient would overflow.
    #[error("balance overflow crediting {0}")]
    Overflow(Address),

    /// Any other refusal from the contract.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// The view of a fungible token contract the ledger depends on.
///
/// Implementations must be safe to share across threads; every call is
/// expected to be atomic on its own.
pub trait TokenContract: Send + Sync {
    /// Balance of `owner`.
    fn balance_of(&self, owner: Address) -> Amount;

    /// Amount `spender` may still move out of `owner`.
    fn allowance(&self, owner: Address, spender: Address) -> Amount;

    /// Moves `amount` from `from` (the caller) to `to`.
    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenState {
    fn balance(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let from_balance = self.balance(&from);
        if from_balance < amount {
            return Err(TransferError::InsufficientBalance {
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;

        self.balances.insert(from, from_balance - amount);
        self.balances.insert(to, to_balance);
        Ok(())
    }
}

/// An in-memory ERC20-style token.
///
/// An allowance of `Amount::MAX` is treated as unlimited and is not consumed
/// by `transfer_from`.
#[derive(Debug)]
pub struct MemoryToken {
    address: Address,
    symbol: String,
    decimals: u8,
    state: RwLock<TokenState>,
}

impl MemoryToken {
    /// Creates a token with zero supply.
    pub fn new(address: Address, symbol: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
            state: RwLock::new(TokenState::default()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> Amount {
        self.state.read().total_supply
    }

    /// Creates `amount` new tokens for `to`.
    pub fn mint(&self, to: Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.write();
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;
        let balance = state
            .balance(&to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow(to))?;
        state.total_supply = supply;
        state.balances.insert(to, balance);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s tokens.
    pub fn approve(&self, owner: Address, spender: Address, amount: Amount) {
        self.state.write().allowances.insert((owner, spender), amount);
    }
}

impl TokenContract for MemoryToken {
    fn balance_of(&self, owner: Address) -> Amount {
        self.state.read().balance(&owner)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.state
            .read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError> {
        self.state.write().move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut state = self.state.write();
        let allowance = state
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or(0);
        if allowance < amount {
            return Err(TransferError::InsufficientAllowance { allowance, amount });
        }

        state.move_balance(from, to, amount)?;

        if allowance != Amount::MAX {
            state.allowances.insert((from, spender), allowance - amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MemoryToken, Address, Address, Address) {
        let token = MemoryToken::new(Address::derive("usd"), "USD", 18);
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let spender = Address::derive("spender");
        token.mint(alice, 1_000).unwrap();
        (token, alice, bob, spender)
    }

    #[test]
    fn mint_and_transfer() {
        let (token, alice, bob, _) = setup();
        token.transfer(alice, bob, 400).unwrap();
        assert_eq!(token.balance_of(alice), 600);
        assert_eq!(token.balance_of(bob), 400);
        assert_eq!(token.total_supply(), 1_000);
    }

    #[test]
    fn transfer_more_than_balance_fails_without_effect() {
        let (token, alice, bob, _) = setup();
        let err = token.transfer(alice, bob, 1_001).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                balance: 1_000,
                amount: 1_001
            }
        );
        assert_eq!(token.balance_of(alice), 1_000);
        assert_eq!(token.balance_of(bob), 0);
    }

    #[test]
    fn transfer_from_requires_allowance() {
        let (token, alice, bob, spender) = setup();
        assert!(matches!(
            token.transfer_from(spender, alice, bob, 1),
            Err(TransferError::InsufficientAllowance { allowance: 0, .. })
        ));

        token.approve(alice, spender, 300);
        token.transfer_from(spender, alice, bob, 200).unwrap();
        assert_eq!(token.allowance(alice, spender), 100);
        assert_eq!(token.balance_of(bob), 200);
    }

    #[test]
    fn unlimited_allowance_is_not_consumed() {
        let (token, alice, bob, spender) = setup();
        token.approve(alice, spender, Amount::MAX);
        token.transfer_from(spender, alice, bob, 500).unwrap();
        assert_eq!(token.allowance(alice, spender), Amount::MAX);
    }

    #[test]
    fn approved_but_broke_still_fails() {
        let (token, alice, bob, spender) = setup();
        token.approve(alice, spender, Amount::MAX);
        assert!(matches!(
            token.transfer_from(spender, alice, bob, Amount::MAX),
            Err(TransferError::InsufficientBalance { .. })
        ));
        assert_eq!(token.balance_of(alice), 1_000);
    }

    #[test]
    fn mint_overflow_rejected() {
        let (token, alice, _, _) = setup();
        assert_eq!(
            token.mint(alice, Amount::MAX),
            Err(TransferError::Overflow(alice))
        );
        assert_eq!(token.total_supply(), 1_000);
    }
}
