//! # Identifiers and Amounts
//!
//! Accounts, token contracts and the native currency are all addressed by a
//! 20-byte [`Address`]. An [`Asset`] is an address used as a balance key: the
//! all-zero address is reserved for the native chain currency, every other
//! value names a token contract reachable through an asset adapter.
//!
//! Amounts are `u128` in the asset's smallest unit. Nothing in the settlement
//! core divides or rounds except the discount lookup, which converts a raw
//! Hydro token balance to whole tokens.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Amount of an asset in its smallest unit.
pub type Amount = u128;

/// Identifier of a market whose collateral accounts hold balances.
pub type MarketId = u16;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Errors from parsing a hex-encoded address.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    /// The input was not valid hex.
    #[error("invalid hex in address: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded input had the wrong number of bytes.
    #[error("address must be {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wraps raw address bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns `true` for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// Derives a deterministic address from a label.
    ///
    /// The address is the first 20 bytes of `BLAKE3(label)`. Fixtures and
    /// demos use this to name accounts (`"alice"`, `"hydro-token"`) without
    /// carrying key material around.
    pub fn derive(label: &str) -> Self {
        let digest = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    /// Returns the `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a hex address, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A fungible value type tracked by the ledger.
///
/// [`Asset::NATIVE`] is the native currency sentinel. Any other asset is the
/// address of a token contract.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(Address);

impl Asset {
    /// The native chain currency.
    pub const NATIVE: Asset = Asset(Address::ZERO);

    /// An asset backed by the token contract at `address`.
    pub const fn token(address: Address) -> Self {
        Self(address)
    }

    /// Returns the underlying address.
    pub fn address(&self) -> Address {
        self.0
    }

    /// Returns `true` for the native currency sentinel.
    pub fn is_native(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Address> for Asset {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            f.write_str("Asset(native)")
        } else {
            write!(f, "Asset({}...)", &self.0.to_hex()[..10])
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
