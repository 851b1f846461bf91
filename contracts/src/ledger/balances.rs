//! The balance ledger service.

use tracing::debug;

use hydro_protocol::asset::{AdapterError, AssetRegistry};
use hydro_protocol::{Address, Amount, Asset, MarketId};

use super::journal::Journal;
use super::path::BalancePath;
use super::store::{BalanceKey, BalanceStore, MemoryStore};
use super::{LedgerError, LedgerOp};

/// Owns the balance table and the adapters that back it with real custody.
#[derive(Debug)]
pub struct BalanceLedger<S: BalanceStore = MemoryStore> {
    store: S,
    registry: AssetRegistry,
}

impl BalanceLedger<MemoryStore> {
    /// Creates an empty in-memory ledger.
    pub fn new(registry: AssetRegistry) -> Self {
        Self::with_store(MemoryStore::new(), registry)
    }
}

impl<S: BalanceStore> BalanceLedger<S> {
    /// Creates a ledger over an existing store.
    pub fn with_store(store: S, registry: AssetRegistry) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AssetRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Moves `amount` of `asset` from the caller's external holdings into
    /// their `Common` balance. `provided_value` is the native value attached
    /// to the call: it must equal `amount` for the native currency and be
    /// zero for tokens.
    ///
    /// Besides [`LedgerError::ValueMismatch`], a native deposit fails with
    /// [`LedgerError::Adapter`] when the caller cannot cover the attached
    /// value, the same as a token pull that is refused. A deposit from the
    /// custody account itself is refused the same way.
    ///
    /// Returns the new `Common` balance.
    pub fn deposit(
        &mut self,
        caller: Address,
        asset: Asset,
        amount: Amount,
        provided_value: Amount,
    ) -> Result<Amount, LedgerError> {
        let expected = if asset.is_native() { amount } else { 0 };
        if provided_value != expected {
            return Err(LedgerError::ValueMismatch {
                amount: expected,
                provided: provided_value,
            });
        }

        let path = BalancePath::common(caller);
        let mut journal = Journal::new(&self.store, LedgerOp::Deposit);
        let balance = journal.credit(asset, &path, amount)?;

        self.registry
            .adapter(asset)
            .and_then(|adapter| adapter.transfer_in(caller, amount))
            .map_err(|source| LedgerError::Adapter {
                op: LedgerOp::Deposit,
                source,
            })?;

        let writes = journal.into_writes();
        self.store.apply(writes);
        debug!(%caller, %asset, amount, balance, "deposit");
        Ok(balance)
    }

    /// Moves `amount` of `asset` from the caller's `Common` balance back to
    /// their external holdings. No partial withdrawals.
    ///
    /// Returns the new `Common` balance.
    pub fn withdraw(
        &mut self,
        caller: Address,
        asset: Asset,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let path = BalancePath::common(caller);
        let mut journal = Journal::new(&self.store, LedgerOp::Withdraw);
        let balance = journal.debit(asset, &path, amount)?;

        self.registry
            .adapter(asset)
            .and_then(|adapter| adapter.transfer_out(caller, amount))
            .map_err(|source| LedgerError::Adapter {
                op: LedgerOp::Withdraw,
                source,
            })?;

        let writes = journal.into_writes();
        self.store.apply(writes);
        debug!(%caller, %asset, amount, balance, "withdraw");
        Ok(balance)
    }

    /// Re-attributes `amount` of `asset` from one balance path to another.
    /// No custody moves. `from == to` is a no-op that still requires the
    /// balance to cover `amount`.
    pub fn transfer(
        &mut self,
        asset: Asset,
        from: &BalancePath,
        to: &BalancePath,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut journal = Journal::new(&self.store, LedgerOp::Transfer);
        journal.debit(asset, from, amount)?;
        journal.credit(asset, to, amount)?;

        let writes = journal.into_writes();
        self.store.apply(writes);
        debug!(%asset, %from, %to, amount, "transfer");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `Common` balance of `user`.
    pub fn balance_of(&self, asset: Asset, user: Address) -> Amount {
        self.balance_at(asset, &BalancePath::common(user))
    }

    /// Collateral balance of `user` in `market_id`.
    pub fn market_balance_of(&self, market_id: MarketId, asset: Asset, user: Address) -> Amount {
        self.balance_at(asset, &BalancePath::collateral(market_id, user))
    }

    /// Balance at an arbitrary path.
    pub fn balance_at(&self, asset: Asset, path: &BalancePath) -> Amount {
        self.store.get(&BalanceKey::new(asset, path))
    }

    /// Sum of `asset` across every path. `None` if the sum exceeds `u128`,
    /// which is only reachable through balances minted outside of deposits.
    pub fn total_balance(&self, asset: Asset) -> Option<Amount> {
        self.store
            .entries(asset)
            .into_iter()
            .try_fold(0u128, |total, (_, amount)| total.checked_add(amount))
    }

    /// What the custody account holds externally. Always at least
    /// [`total_balance`](Self::total_balance) unless custody was drained
    /// behind the ledger's back.
    pub fn custody_balance(&self, asset: Asset) -> Result<Amount, AdapterError> {
        Ok(self.registry.adapter(asset)?.custody_balance())
    }
}
