//! # Balance Ledger
//!
//! Per-user balances of every asset, split into a `Common` balance and one
//! `CollateralAccount` balance per market.
//!
//! ## Atomicity
//!
//! Every mutating operation runs in three phases:
//!
//! 1. Stage all balance changes in a [`Journal`](journal::Journal). Checked
//!    arithmetic runs here, so shortfalls and overflows surface before
//!    anything external happens.
//! 2. Move external custody through the asset's adapter, if the operation
//!    needs it.
//! 3. Commit the staged writes to the [`BalanceStore`](store::BalanceStore).
//!
//! A failure in phase 1 or 2 drops the journal, so the store is never
//! touched by a call that did not succeed end to end.

pub mod balances;
pub mod journal;
pub mod path;
pub mod store;

pub use balances::BalanceLedger;
pub use journal::Journal;
pub use path::{BalanceCategory, BalancePath};
pub use store::{BalanceKey, BalanceStore, MemoryStore};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hydro_protocol::asset::AdapterError;
use hydro_protocol::{Amount, Asset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The mutating ledger operations. Used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerOp {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerOp::Deposit => write!(f, "deposit"),
            LedgerOp::Withdraw => write!(f, "withdraw"),
            LedgerOp::Transfer => write!(f, "transfer"),
        }
    }
}

/// Errors from ledger operations. None of them leave a trace in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The native value attached to a deposit differs from the amount.
    #[error("attached value {provided} does not match deposit amount {amount}")]
    ValueMismatch {
        /// Declared deposit amount (zero for token deposits).
        amount: Amount,
        /// Value actually attached to the call.
        provided: Amount,
    },

    /// The source balance is smaller than the requested amount.
    #[error("{op}: balance {available} of {asset} at {path} is below {requested}")]
    InsufficientBalance {
        /// Operation that was refused.
        op: LedgerOp,
        /// Asset being moved.
        asset: Asset,
        /// Source balance path.
        path: BalancePath,
        /// Current balance at `path`.
        available: Amount,
        /// Amount the caller asked for.
        requested: Amount,
    },

    /// Crediting the destination would overflow a `u128`.
    #[error("{op}: crediting {credit} of {asset} to {path} overflows balance {current}")]
    Overflow {
        /// Operation that was refused.
        op: LedgerOp,
        /// Asset being moved.
        asset: Asset,
        /// Destination balance path.
        path: BalancePath,
        /// Current balance at `path`.
        current: Amount,
        /// Amount being credited.
        credit: Amount,
    },

    /// The asset adapter refused to move custody.
    #[error("{op}: {source}")]
    Adapter {
        /// Operation that was refused.
        op: LedgerOp,
        /// What the adapter reported.
        #[source]
        source: AdapterError,
    },

    /// A raw balance category outside `{0, 1}`.
    #[error("unknown balance category {0}")]
    InvalidCategory(u8),
}

impl LedgerError {
    /// The operation this error aborted, when it is tied to one.
    pub fn op(&self) -> Option<LedgerOp> {
        match self {
            LedgerError::ValueMismatch { .. } => Some(LedgerOp::Deposit),
            LedgerError::InsufficientBalance { op, .. }
            | LedgerError::Overflow { op, .. }
            | LedgerError::Adapter { op, .. } => Some(*op),
            LedgerError::InvalidCategory(_) => None,
        }
    }
}
