//! Adapter lookup by asset.

use std::collections::HashMap;
use std::sync::Arc;

use super::adapter::{AdapterError, AssetAdapter, NativeAdapter, TokenAdapter};
use super::native::NativeCurrency;
use super::token::TokenContract;
use crate::types::{Address, Asset};

/// Maps every known asset to the adapter that moves its custody.
///
/// The native currency is always present. Token assets must be registered
/// before they can be deposited; lookups for anything else fail with
/// [`AdapterError::UnknownAsset`].
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    custody: Address,
    native: AssetAdapter,
    tokens: HashMap<Asset, AssetAdapter>,
}

impl AssetRegistry {
    /// Creates a registry whose adapters all settle into `custody`.
    pub fn new(custody: Address, native: Arc<dyn NativeCurrency>) -> Self {
        Self {
            custody,
            native: AssetAdapter::Native(NativeAdapter::new(native, custody)),
            tokens: HashMap::new(),
        }
    }

    /// The custody account every adapter settles into.
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Registers (or replaces) the token contract at `address`.
    pub fn register_token(
        &mut self,
        address: Address,
        contract: Arc<dyn TokenContract>,
    ) -> Result<Asset, AdapterError> {
        if address.is_zero() {
            return Err(AdapterError::ReservedAddress);
        }
        let asset = Asset::token(address);
        self.tokens.insert(
            asset,
            AssetAdapter::Token(TokenAdapter::new(asset, contract, self.custody)),
        );
        tracing::debug!(%asset, "registered token adapter");
        Ok(asset)
    }

    /// Returns the adapter for `asset`.
    pub fn adapter(&self, asset: Asset) -> Result<&AssetAdapter, AdapterError> {
        if asset.is_native() {
            return Ok(&self.native);
        }
        self.tokens
            .get(&asset)
            .ok_or(AdapterError::UnknownAsset(asset))
    }

    /// Returns `true` if deposits of `asset` can be routed.
    pub fn is_registered(&self, asset: Asset) -> bool {
        asset.is_native() || self.tokens.contains_key(&asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::native::MemoryNative;
    use crate::asset::token::MemoryToken;

    #[test]
    fn native_always_resolves() {
        let registry =
            AssetRegistry::new(Address::derive("custody"), Arc::new(MemoryNative::new()));
        assert!(registry.is_registered(Asset::NATIVE));
        assert_eq!(registry.adapter(Asset::NATIVE).unwrap().asset(), Asset::NATIVE);
    }

    #[test]
    fn tokens_must_be_registered() {
        let mut registry =
            AssetRegistry::new(Address::derive("custody"), Arc::new(MemoryNative::new()));
        let usd = Address::derive("usd");
        assert!(matches!(
            registry.adapter(Asset::token(usd)),
            Err(AdapterError::UnknownAsset(_))
        ));

        let token = Arc::new(MemoryToken::new(usd, "USD", 18));
        let asset = registry.register_token(usd, token).unwrap();
        assert_eq!(registry.adapter(asset).unwrap().asset(), asset);
    }

    #[test]
    fn zero_address_is_reserved() {
        let mut registry =
            AssetRegistry::new(Address::derive("custody"), Arc::new(MemoryNative::new()));
        let token = Arc::new(MemoryToken::new(Address::ZERO, "BAD", 18));
        assert_eq!(
            registry.register_token(Address::ZERO, token).unwrap_err(),
            AdapterError::ReservedAddress
        );
    }
}
