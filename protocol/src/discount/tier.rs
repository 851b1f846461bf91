//! # Discount Tiers
//!
//! A [`DiscountConfig`] is a fixed array of [`MAX_DISCOUNT_TIERS`] slots.
//! Tiers are scanned from the richest threshold to the poorest, whatever
//! order the slots were written in: the highest threshold the holder meets
//! wins. When two slots share a threshold the one listed first wins. A slot
//! with a zero threshold is unused and never matches. A holder who meets no
//! slot pays the full fee ([`DISCOUNT_RATE_BASE`]).
//!
//! Slots are stored exactly as given, so a table round-trips through the
//! packed form unchanged.

use serde::{Deserialize, Serialize};

use super::codec::CodecError;
use crate::config::{DISCOUNT_RATE_BASE, MAX_DISCOUNT_THRESHOLD, MAX_DISCOUNT_TIERS};
use crate::types::Amount;

/// A `(threshold, rate)` pair.
///
/// `threshold` is in whole Hydro tokens and must fit in 48 bits; `rate` is
/// the percentage of the fee still charged, in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Minimum whole-token balance for this tier.
    pub threshold: u64,
    /// Fee percentage charged at this tier.
    pub rate: u16,
}

impl DiscountTier {
    /// The unused slot.
    pub const UNUSED: DiscountTier = DiscountTier {
        threshold: 0,
        rate: 0,
    };

    pub const fn new(threshold: u64, rate: u16) -> Self {
        Self { threshold, rate }
    }

    /// Returns `true` if this slot can never match.
    pub fn is_unused(&self) -> bool {
        self.threshold == 0
    }
}

/// A complete discount tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountConfig {
    tiers: [DiscountTier; MAX_DISCOUNT_TIERS],
}

impl Default for DiscountConfig {
    /// No discount for anyone.
    fn default() -> Self {
        Self {
            tiers: [DiscountTier::UNUSED; MAX_DISCOUNT_TIERS],
        }
    }
}

impl DiscountConfig {
    /// Builds a table from up to six tiers, in any order. Missing slots are
    /// filled with [`DiscountTier::UNUSED`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TooManyTiers`] for more than six tiers,
    /// [`CodecError::ThresholdOutOfRange`] for thresholds above `2^48 - 1`
    /// and [`CodecError::RateOutOfRange`] for rates above 100.
    pub fn new(tiers: Vec<DiscountTier>) -> Result<Self, CodecError> {
        if tiers.len() > MAX_DISCOUNT_TIERS {
            return Err(CodecError::TooManyTiers(tiers.len()));
        }

        let mut slots = [DiscountTier::UNUSED; MAX_DISCOUNT_TIERS];
        for (slot, tier) in tiers.into_iter().enumerate() {
            if tier.threshold > MAX_DISCOUNT_THRESHOLD {
                return Err(CodecError::ThresholdOutOfRange {
                    slot,
                    threshold: tier.threshold,
                });
            }
            if tier.rate > DISCOUNT_RATE_BASE {
                return Err(CodecError::RateOutOfRange {
                    slot,
                    rate: tier.rate,
                });
            }
            slots[slot] = tier;
        }

        Ok(Self { tiers: slots })
    }

    /// Wraps already validated slots. Only the decoder calls this.
    pub(crate) fn from_slots(tiers: [DiscountTier; MAX_DISCOUNT_TIERS]) -> Self {
        Self { tiers }
    }

    /// All six slots, including unused ones, in stored order.
    pub fn slots(&self) -> &[DiscountTier; MAX_DISCOUNT_TIERS] {
        &self.tiers
    }

    /// The slots that can match, in stored order.
    pub fn active_tiers(&self) -> impl Iterator<Item = &DiscountTier> {
        self.tiers.iter().filter(|tier| !tier.is_unused())
    }

    /// Returns the rate for a balance expressed in whole tokens.
    pub fn rate_for(&self, whole_tokens: u128) -> u16 {
        self.active_tiers()
            .filter(|tier| whole_tokens >= u128::from(tier.threshold))
            .fold(None::<&DiscountTier>, |best, tier| match best {
                Some(best) if best.threshold >= tier.threshold => Some(best),
                _ => Some(tier),
            })
            .map(|tier| tier.rate)
            .unwrap_or(DISCOUNT_RATE_BASE)
    }

    /// Returns the rate for a raw token balance with `decimals` decimals.
    ///
    /// A zero balance always pays the full fee.
    pub fn rate_for_balance(&self, balance: Amount, decimals: u8) -> u16 {
        if balance == 0 {
            return DISCOUNT_RATE_BASE;
        }
        let whole = match 10u128.checked_pow(u32::from(decimals)) {
            Some(unit) => balance / unit,
            None => 0,
        };
        self.rate_for(whole)
    }
}
