//! # Asset Module: Custody Boundary
//!
//! The ledger keeps books; the assets themselves live elsewhere. This module
//! is the seam between the two.
//!
//! ```text
//! token.rs     TokenContract trait (ERC20 subset) + MemoryToken
//! native.rs    NativeCurrency trait + MemoryNative
//! adapter.rs   AssetAdapter: Native | Token, transfer_in / transfer_out
//! registry.rs  AssetRegistry: asset -> adapter
//! ```

pub mod adapter;
pub mod native;
pub mod registry;
pub mod token;

pub use adapter::{AdapterError, AssetAdapter, NativeAdapter, TokenAdapter};
pub use native::{MemoryNative, NativeCurrency};
pub use registry::AssetRegistry;
pub use token::{MemoryToken, TokenContract, TransferError};
