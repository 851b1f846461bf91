//! # Balance Store
//!
//! The ledger's persistent state is a single keyed table
//! `(asset, normalized path) -> amount`. [`BalanceStore`] is the seam for
//! swapping the backing table; [`MemoryStore`] keeps it in a `BTreeMap` so
//! iteration (and therefore any derived total) is deterministic.
//!
//! A store never validates anything. All checks happen while staging writes
//! in a [`Journal`](super::journal::Journal); a store only ever receives a
//! batch that is already known to be good.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hydro_protocol::{Amount, Asset};

use super::path::BalancePath;

/// Storage key of one balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub asset: Asset,
    pub path: BalancePath,
}

impl BalanceKey {
    /// Builds the key, normalizing the path.
    pub fn new(asset: Asset, path: &BalancePath) -> Self {
        Self {
            asset,
            path: path.normalized(),
        }
    }
}

/// Backing table for ledger balances.
pub trait BalanceStore {
    /// Current amount at `key`; zero if never written.
    fn get(&self, key: &BalanceKey) -> Amount;

    /// Writes a batch of final amounts. Must apply every write or none.
    fn apply(&mut self, writes: Vec<(BalanceKey, Amount)>);

    /// Every stored `(path, amount)` for `asset`, zero balances included.
    fn entries(&self, asset: Asset) -> Vec<(BalancePath, Amount)>;
}

/// In-memory balance table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    balances: BTreeMap<BalanceKey, Amount>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, zero balances included.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl BalanceStore for MemoryStore {
    fn get(&self, key: &BalanceKey) -> Amount {
        self.balances.get(key).copied().unwrap_or(0)
    }

    fn apply(&mut self, writes: Vec<(BalanceKey, Amount)>) {
        // Zero is a real state, not a deletion.
        self.balances.extend(writes);
    }

    fn entries(&self, asset: Asset) -> Vec<(BalancePath, Amount)> {
        self.balances
            .iter()
            .filter(|(key, _)| key.asset == asset)
            .map(|(key, amount)| (key.path, *amount))
            .collect()
    }
}
