//! # Hydro Settlement Contracts
//!
//! The stateful core of the Hydro margin settlement layer:
//!
//! - **Balance Ledger**: per-user balances of every asset, split into a
//!   `Common` balance and one collateral account per market, backed by real
//!   custody through asset adapters.
//! - **Discount Tier Table**: fee discounts derived live from Hydro token
//!   holdings, reconfigurable by the owner.
//! - **Access Control**: a single owner gate for privileged calls.
//! - **Hydro**: the entry point tying the three together behind one
//!   mutual-exclusion boundary, with events and metrics.
//!
//! ## Design Principles
//!
//! 1. All monetary operations are checked. An amount that would overflow or
//!    go negative is an error, never a wrapped value.
//! 2. Every call is all-or-nothing. Balance changes are staged and only
//!    committed after every step, external transfers included, succeeded.
//! 3. Errors carry a stable code so callers can dispatch on them.

pub mod discount;
pub mod error;
pub mod events;
pub mod hydro;
pub mod ledger;
pub mod metrics;
pub mod ownable;

pub use discount::{DiscountError, DiscountTierTable};
pub use error::{ErrorKind, HydroError};
pub use events::HydroEvent;
pub use hydro::{CallContext, Hydro};
pub use ledger::{BalanceCategory, BalanceLedger, BalancePath, LedgerError, LedgerOp};
pub use metrics::LedgerMetrics;
pub use ownable::{AccessError, Ownable};
