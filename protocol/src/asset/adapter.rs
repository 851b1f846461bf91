//! # Asset Adapters
//!
//! An [`AssetAdapter`] moves real custody in and out of the ledger's custody
//! account. There are exactly two kinds:
//!
//! - [`NativeAdapter`] settles native value attached to the call.
//! - [`TokenAdapter`] pulls tokens with `transfer_from` (the depositor must
//!   have approved the custody account) and pushes them back with `transfer`.
//!
//! Whatever the external side reports (missing allowance, short balance, a
//! plain refusal) comes back as one [`AdapterError`] kind per direction. The
//! underlying reason is kept for logs only.

use std::sync::Arc;

use thiserror::Error;

use super::native::NativeCurrency;
use super::token::{TokenContract, TransferError};
use crate::types::{Address, Amount, Asset};

/// Failures while moving custody through an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Pulling funds into custody failed.
    #[error("transfer into custody failed for asset {asset}: {reason}")]
    TransferInFailed {
        /// Asset being moved.
        asset: Asset,
        /// What the external side reported.
        reason: TransferError,
    },

    /// Paying funds out of custody failed.
    #[error("transfer out of custody failed for asset {asset}: {reason}")]
    TransferOutFailed {
        /// Asset being moved.
        asset: Asset,
        /// What the external side reported.
        reason: TransferError,
    },

    /// No adapter is registered for the asset. Behaves like a contract call
    /// to an address with no code: it always fails.
    #[error("no adapter registered for asset {0}")]
    UnknownAsset(Asset),

    /// The native sentinel cannot be registered as a token.
    #[error("the zero address is reserved for the native currency")]
    ReservedAddress,
}

/// Native currency custody.
#[derive(Clone)]
pub struct NativeAdapter {
    currency: Arc<dyn NativeCurrency>,
    custody: Address,
}

impl NativeAdapter {
    pub fn new(currency: Arc<dyn NativeCurrency>, custody: Address) -> Self {
        Self { currency, custody }
    }

    fn transfer_in(&self, from: Address, amount: Amount) -> Result<(), AdapterError> {
        self.currency
            .transfer(from, self.custody, amount)
            .map_err(|reason| AdapterError::TransferInFailed {
                asset: Asset::NATIVE,
                reason,
            })
    }

    fn transfer_out(&self, to: Address, amount: Amount) -> Result<(), AdapterError> {
        self.currency
            .transfer(self.custody, to, amount)
            .map_err(|reason| AdapterError::TransferOutFailed {
                asset: Asset::NATIVE,
                reason,
            })
    }
}

/// Token custody through a [`TokenContract`].
#[derive(Clone)]
pub struct TokenAdapter {
    asset: Asset,
    contract: Arc<dyn TokenContract>,
    custody: Address,
}

impl TokenAdapter {
    pub fn new(asset: Asset, contract: Arc<dyn TokenContract>, custody: Address) -> Self {
        Self {
            asset,
            contract,
            custody,
        }
    }

    /// The underlying token contract.
    pub fn contract(&self) -> &Arc<dyn TokenContract> {
        &self.contract
    }

    fn transfer_in(&self, from: Address, amount: Amount) -> Result<(), AdapterError> {
        self.contract
            .transfer_from(self.custody, from, self.custody, amount)
            .map_err(|reason| AdapterError::TransferInFailed {
                asset: self.asset,
                reason,
            })
    }

    fn transfer_out(&self, to: Address, amount: Amount) -> Result<(), AdapterError> {
        self.contract
            .transfer(self.custody, to, amount)
            .map_err(|reason| AdapterError::TransferOutFailed {
                asset: self.asset,
                reason,
            })
    }
}

/// Custody mover for one asset.
#[derive(Clone)]
pub enum AssetAdapter {
    Native(NativeAdapter),
    Token(TokenAdapter),
}

impl AssetAdapter {
    /// The asset this adapter moves.
    pub fn asset(&self) -> Asset {
        match self {
            AssetAdapter::Native(_) => Asset::NATIVE,
            AssetAdapter::Token(adapter) => adapter.asset,
        }
    }

    /// The account holding this asset's custody.
    pub fn custody(&self) -> Address {
        match self {
            AssetAdapter::Native(adapter) => adapter.custody,
            AssetAdapter::Token(adapter) => adapter.custody,
        }
    }

    /// Brings `amount` from `from` into custody.
    ///
    /// The custody account itself cannot pay in: moving its own funds to
    /// itself would credit the ledger without any custody change.
    pub fn transfer_in(&self, from: Address, amount: Amount) -> Result<(), AdapterError> {
        if from == self.custody() {
            return Err(AdapterError::TransferInFailed {
                asset: self.asset(),
                reason: TransferError::Rejected("custody account cannot pay into itself".into()),
            });
        }
        match self {
            AssetAdapter::Native(adapter) => adapter.transfer_in(from, amount),
            AssetAdapter::Token(adapter) => adapter.transfer_in(from, amount),
        }
    }

    /// Sends `amount` from custody to `to`.
    pub fn transfer_out(&self, to: Address, amount: Amount) -> Result<(), AdapterError> {
        match self {
            AssetAdapter::Native(adapter) => adapter.transfer_out(to, amount),
            AssetAdapter::Token(adapter) => adapter.transfer_out(to, amount),
        }
    }

    /// What the custody account holds of this asset externally.
    pub fn custody_balance(&self) -> Amount {
        match self {
            AssetAdapter::Native(adapter) => adapter.currency.balance_of(adapter.custody),
            AssetAdapter::Token(adapter) => adapter.contract.balance_of(adapter.custody),
        }
    }
}

impl std::fmt::Debug for AssetAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetAdapter::Native(a) => write!(f, "AssetAdapter::Native(custody={})", a.custody),
            AssetAdapter::Token(a) => {
                write!(f, "AssetAdapter::Token({}, custody={})", a.asset, a.custody)
            }
        }
    }
}
