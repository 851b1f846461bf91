// Copyright (c) 2026 Hydro Protocol Developers. MIT License.
// See LICENSE for details.

//! # Hydro Protocol: Core Primitives
//!
//! Building blocks shared by the Hydro settlement contracts:
//!
//! - **types**: addresses, assets, amounts, market ids.
//! - **asset**: the custody boundary: token contracts, native currency, and
//!   the adapters that move value in and out of the ledger's custody account.
//! - **discount**: fee discount tiers and their packed, versioned encoding.
//! - **config**: protocol constants and the deployment config file.
//! - **logging**: `tracing` subscriber setup.
//!
//! ## Design Principles
//!
//! 1. Amounts are `u128` in smallest units and every operation on them is
//!    checked. Money does not wrap.
//! 2. External custody is reached only through traits, so the ledger can be
//!    exercised against in-memory stand-ins and real deployments alike.
//! 3. Wire formats are fixed-width and versioned, with exact round trips.

pub mod asset;
pub mod config;
pub mod discount;
pub mod logging;
pub mod types;

pub use types::{Address, Amount, Asset, MarketId};
