//! # Discount Module: Fee Discount Tiers
//!
//! Hydro token holders pay a reduced trading fee. The reduction is looked up
//! in a small tier table that the owner replaces wholesale, shipped around in
//! a fixed-width packed form.
//!
//! ```text
//! tier.rs    DiscountTier / DiscountConfig and the rate lookup
//! codec.rs   PackedDiscountConfig: versioned 49-byte encoding
//! ```

pub mod codec;
pub mod tier;

pub use codec::{CodecError, PackedDiscountConfig};
pub use tier::{DiscountConfig, DiscountTier};
