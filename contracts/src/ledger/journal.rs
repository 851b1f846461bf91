//! Staged balance writes for one ledger operation.

use std::collections::BTreeMap;

use hydro_protocol::{Amount, Asset};

use super::path::BalancePath;
use super::store::{BalanceKey, BalanceStore};
use super::{LedgerError, LedgerOp};

/// Read-through overlay over a [`BalanceStore`].
///
/// Reads see staged values first, so a sequence of debits and credits on the
/// same key composes correctly (a self-transfer debits then credits the same
/// slot). Nothing reaches the store until [`Journal::into_writes`] is handed
/// to [`BalanceStore::apply`]; dropping the journal discards everything.
#[derive(Debug)]
pub struct Journal<'a, S: BalanceStore + ?Sized> {
    store: &'a S,
    op: LedgerOp,
    staged: BTreeMap<BalanceKey, Amount>,
}

impl<'a, S: BalanceStore + ?Sized> Journal<'a, S> {
    pub fn new(store: &'a S, op: LedgerOp) -> Self {
        Self {
            store,
            op,
            staged: BTreeMap::new(),
        }
    }

    /// Balance at `path` as this journal currently sees it.
    pub fn balance(&self, asset: Asset, path: &BalancePath) -> Amount {
        let key = BalanceKey::new(asset, path);
        self.staged
            .get(&key)
            .copied()
            .unwrap_or_else(|| self.store.get(&key))
    }

    /// Stages `path += amount`. Returns the staged balance.
    pub fn credit(
        &mut self,
        asset: Asset,
        path: &BalancePath,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let current = self.balance(asset, path);
        let next = current.checked_add(amount).ok_or(LedgerError::Overflow {
            op: self.op,
            asset,
            path: path.normalized(),
            current,
            credit: amount,
        })?;
        self.staged.insert(BalanceKey::new(asset, path), next);
        Ok(next)
    }

    /// Stages `path -= amount`. Returns the staged balance.
    pub fn debit(
        &mut self,
        asset: Asset,
        path: &BalancePath,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let available = self.balance(asset, path);
        let next = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                op: self.op,
                asset,
                path: path.normalized(),
                available,
                requested: amount,
            })?;
        self.staged.insert(BalanceKey::new(asset, path), next);
        Ok(next)
    }

    /// Number of distinct keys touched.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Consumes the journal, yielding the final value of every touched key.
    pub fn into_writes(self) -> Vec<(BalanceKey, Amount)> {
        self.staged.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::store::MemoryStore;
    use hydro_protocol::Address;

    fn seeded(amount: Amount) -> (MemoryStore, BalancePath) {
        let path = BalancePath::common(Address::derive("alice"));
        let mut store = MemoryStore::new();
        store.apply(vec![(BalanceKey::new(Asset::NATIVE, &path), amount)]);
        (store, path)
    }

    #[test]
    fn reads_fall_through_to_store() {
        let (store, path) = seeded(9);
        let journal = Journal::new(&store, LedgerOp::Transfer);
        assert_eq!(journal.balance(Asset::NATIVE, &path), 9);
        assert!(journal.is_empty());
    }

    #[test]
    fn staged_values_shadow_store() {
        let (store, path) = seeded(9);
        let mut journal = Journal::new(&store, LedgerOp::Transfer);
        assert_eq!(journal.debit(Asset::NATIVE, &path, 4).unwrap(), 5);
        assert_eq!(journal.credit(Asset::NATIVE, &path, 4).unwrap(), 9);
        assert_eq!(journal.len(), 1);
        // Store untouched until commit.
        assert_eq!(store.get(&BalanceKey::new(Asset::NATIVE, &path)), 9);
    }

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let (store, path) = seeded(1);
        let mut journal = Journal::new(&store, LedgerOp::Withdraw);
        let err = journal.debit(Asset::NATIVE, &path, 100).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                op: LedgerOp::Withdraw,
                asset: Asset::NATIVE,
                path,
                available: 1,
                requested: 100,
            }
        );
        assert!(journal.is_empty());
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let (store, path) = seeded(Amount::MAX);
        let mut journal = Journal::new(&store, LedgerOp::Deposit);
        assert!(matches!(
            journal.credit(Asset::NATIVE, &path, 1),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[test]
    fn writes_commit_in_one_batch() {
        let (mut store, from) = seeded(10);
        let to = BalancePath::collateral(1, Address::derive("alice"));
        let writes = {
            let mut journal = Journal::new(&store, LedgerOp::Transfer);
            journal.debit(Asset::NATIVE, &from, 3).unwrap();
            journal.credit(Asset::NATIVE, &to, 3).unwrap();
            journal.into_writes()
        };
        store.apply(writes);
        assert_eq!(store.get(&BalanceKey::new(Asset::NATIVE, &from)), 7);
        assert_eq!(store.get(&BalanceKey::new(Asset::NATIVE, &to)), 3);
    }
}
