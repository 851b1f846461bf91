//! # Protocol Configuration & Constants
//!
//! Every fixed parameter of the settlement core lives here, next to the
//! [`HydroConfig`] file format used to bootstrap a deployment.
//!
//! The discount constants are part of the packed configuration contract: the
//! encoder and decoder in [`crate::discount::codec`] agree on them bit for bit,
//! so changing any of them is a format version bump.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::discount::{CodecError, DiscountConfig, PackedDiscountConfig};
use crate::types::Address;

// ---------------------------------------------------------------------------
// Discount Parameters
// ---------------------------------------------------------------------------

/// Rate returned when no discount applies: the user pays 100% of the fee.
pub const DISCOUNT_RATE_BASE: u16 = 100;

/// Number of tier slots in a packed discount configuration.
pub const MAX_DISCOUNT_TIERS: usize = 6;

/// Version byte at the head of every packed discount configuration.
pub const DISCOUNT_CONFIG_VERSION: u8 = 1;

/// Width of the threshold field in bits.
pub const DISCOUNT_THRESHOLD_BITS: u32 = 48;

/// Width of the rate field in bits.
pub const DISCOUNT_RATE_BITS: u32 = 16;

/// Largest threshold the packed format can carry (`2^48 - 1`).
pub const MAX_DISCOUNT_THRESHOLD: u64 = (1u64 << DISCOUNT_THRESHOLD_BITS) - 1;

/// Bytes per tier slot: 6 bytes of threshold followed by 2 bytes of rate.
pub const DISCOUNT_TIER_BYTES: usize =
    ((DISCOUNT_THRESHOLD_BITS + DISCOUNT_RATE_BITS) / 8) as usize;

/// Total packed length: version byte plus every tier slot.
pub const PACKED_DISCOUNT_CONFIG_LEN: usize = 1 + MAX_DISCOUNT_TIERS * DISCOUNT_TIER_BYTES;

/// Decimals of the Hydro token. Tier thresholds are expressed in whole
/// tokens, so balances are divided by `10^decimals` before comparison.
pub const HYDRO_TOKEN_DECIMALS: u8 = 18;

// ---------------------------------------------------------------------------
// Deployment Config
// ---------------------------------------------------------------------------

/// Errors raised while loading a [`HydroConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file was not valid JSON or did not match the schema.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The owner address is the zero address.
    #[error("owner must not be the zero address")]
    ZeroOwner,

    /// The Hydro token address is the zero (native) address.
    #[error("hydro token must be a token contract, not the native currency")]
    NativeHydroToken,

    /// The initial discount configuration failed to decode.
    #[error("invalid initial discount config: {0}")]
    Discount(#[from] CodecError),

    /// Decimals so large that `10^decimals` overflows a `u128`.
    #[error("hydro token decimals {0} out of range (max 38)")]
    Decimals(u8),
}

fn default_decimals() -> u8 {
    HYDRO_TOKEN_DECIMALS
}

/// Bootstrap parameters for a Hydro deployment.
///
/// ```json
/// {
///   "owner": "0x5b38da6a701c568545dcfcb03fcb875f56beddc4",
///   "hydro_token": "0x4b0897b0513fdc7c541b6d9d7e929c4e5364d2db",
///   "hydro_token_decimals": 18,
///   "discount_config": "0x01..."
/// }
/// ```
///
/// `discount_config` is optional; without it the table starts with no
/// discount at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydroConfig {
    /// Account allowed to reconfigure discount tiers.
    pub owner: Address,
    /// Governance token whose holdings determine the discount.
    pub hydro_token: Address,
    /// Decimals of the Hydro token.
    #[serde(default = "default_decimals")]
    pub hydro_token_decimals: u8,
    /// Hex-encoded packed discount configuration.
    #[serde(default)]
    pub discount_config: Option<String>,
}

impl HydroConfig {
    /// Builds a config with the default decimals and no discount tiers.
    pub fn new(owner: Address, hydro_token: Address) -> Self {
        Self {
            owner,
            hydro_token,
            hydro_token_decimals: HYDRO_TOKEN_DECIMALS,
            discount_config: None,
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: HydroConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), owner = %config.owner, "loaded hydro config");
        Ok(config)
    }

    /// Checks the invariants a deployment relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroOwner);
        }
        if self.hydro_token.is_zero() {
            return Err(ConfigError::NativeHydroToken);
        }
        if 10u128.checked_pow(u32::from(self.hydro_token_decimals)).is_none() {
            return Err(ConfigError::Decimals(self.hydro_token_decimals));
        }
        self.initial_discount_config()?;
        Ok(())
    }

    /// Decodes the initial discount table, defaulting to no discount.
    pub fn initial_discount_config(&self) -> Result<DiscountConfig, ConfigError> {
        match &self.discount_config {
            Some(hex) => Ok(PackedDiscountConfig::from_hex(hex)?.decode()?),
            None => Ok(DiscountConfig::default()),
        }
    }
}
