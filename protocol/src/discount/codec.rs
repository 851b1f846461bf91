//! # Packed Discount Configuration
//!
//! Wire layout, version 1 (49 bytes, big-endian fields):
//!
//! ```text
//! +---------+------------------------+------------------------+-----+
//! | version | slot 0                 | slot 1                 | ... |
//! | 1 byte  | threshold 6B | rate 2B | threshold 6B | rate 2B |     |
//! +---------+------------------------+------------------------+-----+
//! ```
//!
//! Six slots follow the version byte, in the order they were given. Unused slots are
//! all zero. Any 49-byte string with the right version decodes to some table;
//! the only rejections are a foreign version and a rate above 100. Decoding
//! keeps every slot verbatim, so `decode(encode(t)) == t` and
//! `encode(decode(p)) == p` for every accepted `p`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::tier::{DiscountConfig, DiscountTier};
use crate::config::{
    DISCOUNT_CONFIG_VERSION, DISCOUNT_RATE_BASE, DISCOUNT_TIER_BYTES, MAX_DISCOUNT_TIERS,
    PACKED_DISCOUNT_CONFIG_LEN,
};

const THRESHOLD_BYTES: usize = 6;

/// Errors from building, encoding or decoding a discount configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The packed form had the wrong length.
    #[error("packed discount config must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// The hex form could not be decoded.
    #[error("invalid hex in discount config: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The version byte is not one this build understands.
    #[error("unsupported discount config version {0}")]
    UnsupportedVersion(u8),

    /// A rate above 100.
    #[error("tier {slot} rate {rate} is outside [0, 100]")]
    RateOutOfRange {
        /// Offending slot index.
        slot: usize,
        /// Offending rate.
        rate: u16,
    },

    /// A threshold that does not fit the 48-bit field.
    #[error("tier {slot} threshold {threshold} does not fit in 48 bits")]
    ThresholdOutOfRange {
        /// Offending slot index.
        slot: usize,
        /// Offending threshold.
        threshold: u64,
    },

    /// More tiers than slots.
    #[error("at most {MAX_DISCOUNT_TIERS} discount tiers are supported, got {0}")]
    TooManyTiers(usize),
}

/// The fixed-width encoded form of a [`DiscountConfig`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedDiscountConfig([u8; PACKED_DISCOUNT_CONFIG_LEN]);

impl Default for PackedDiscountConfig {
    fn default() -> Self {
        DiscountConfig::default().encode()
    }
}

impl PackedDiscountConfig {
    /// Copies a packed config out of a byte slice of exactly 49 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != PACKED_DISCOUNT_CONFIG_LEN {
            return Err(CodecError::InvalidLength {
                expected: PACKED_DISCOUNT_CONFIG_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; PACKED_DISCOUNT_CONFIG_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parses the hex form, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        Self::from_bytes(&hex::decode(raw)?)
    }

    /// Returns the `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; PACKED_DISCOUNT_CONFIG_LEN] {
        &self.0
    }

    /// The version byte.
    pub fn version(&self) -> u8 {
        self.0[0]
    }

    /// Decodes and range-checks the table.
    pub fn decode(&self) -> Result<DiscountConfig, CodecError> {
        if self.version() != DISCOUNT_CONFIG_VERSION {
            return Err(CodecError::UnsupportedVersion(self.version()));
        }

        let mut slots = [DiscountTier::UNUSED; MAX_DISCOUNT_TIERS];
        for (slot, chunk) in self.0[1..].chunks_exact(DISCOUNT_TIER_BYTES).enumerate() {
            let mut threshold = [0u8; 8];
            threshold[8 - THRESHOLD_BYTES..].copy_from_slice(&chunk[..THRESHOLD_BYTES]);
            let threshold = u64::from_be_bytes(threshold);
            let rate = u16::from_be_bytes([chunk[THRESHOLD_BYTES], chunk[THRESHOLD_BYTES + 1]]);

            if rate > DISCOUNT_RATE_BASE {
                return Err(CodecError::RateOutOfRange { slot, rate });
            }
            slots[slot] = DiscountTier::new(threshold, rate);
        }

        Ok(DiscountConfig::from_slots(slots))
    }
}

impl DiscountConfig {
    /// Encodes the table into its packed form.
    ///
    /// Every `DiscountConfig` has already passed range checks, so encoding
    /// cannot fail.
    pub fn encode(&self) -> PackedDiscountConfig {
        let mut out = [0u8; PACKED_DISCOUNT_CONFIG_LEN];
        out[0] = DISCOUNT_CONFIG_VERSION;
        for (chunk, tier) in out[1..]
            .chunks_exact_mut(DISCOUNT_TIER_BYTES)
            .zip(self.slots().iter())
        {
            let threshold = tier.threshold.to_be_bytes();
            chunk[..THRESHOLD_BYTES].copy_from_slice(&threshold[8 - THRESHOLD_BYTES..]);
            chunk[THRESHOLD_BYTES..].copy_from_slice(&tier.rate.to_be_bytes());
        }
        PackedDiscountConfig(out)
    }
}

impl fmt::Debug for PackedDiscountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedDiscountConfig({})", self.to_hex())
    }
}

impl fmt::Display for PackedDiscountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for PackedDiscountConfig {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for PackedDiscountConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PackedDiscountConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
