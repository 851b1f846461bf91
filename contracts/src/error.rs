//! # Error Taxonomy
//!
//! Every failure a caller can see folds into [`HydroError`]. Callers dispatch
//! on [`HydroError::kind`] or on the stable identifier from
//! [`HydroError::code`]; the `Display` text is for humans and logs only.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hydro_protocol::asset::AdapterError;
use hydro_protocol::config::ConfigError;

use crate::discount::DiscountError;
use crate::ledger::{LedgerError, LedgerOp};
use crate::ownable::AccessError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Attached native value differs from the declared deposit amount.
    ValueMismatch,
    /// The asset adapter refused to move custody.
    TokenTransferFailed,
    /// The source balance does not cover the amount.
    InsufficientBalance,
    /// A privileged call from someone other than the owner.
    NotOwner,
    /// A configuration that does not decode or validate.
    InvalidConfig,
    /// A credit that would overflow the balance type.
    BalanceOverflow,
    /// An ownership hand-over to the zero address.
    InvalidOwner,
    /// Failures outside the settlement rules, such as metrics setup.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Any error returned by the settlement core.
#[derive(Debug, Error)]
pub enum HydroError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Access(#[from] AccessError),

    /// Registering a token adapter failed.
    #[error("asset registration failed: {0}")]
    Registry(#[source] AdapterError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl HydroError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HydroError::Ledger(err) => match err {
                LedgerError::ValueMismatch { .. } => ErrorKind::ValueMismatch,
                LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
                LedgerError::Overflow { .. } => ErrorKind::BalanceOverflow,
                LedgerError::Adapter { .. } => ErrorKind::TokenTransferFailed,
                LedgerError::InvalidCategory(_) => ErrorKind::InvalidConfig,
            },
            HydroError::Discount(DiscountError::Access(err)) | HydroError::Access(err) => {
                match err {
                    AccessError::NotOwner { .. } => ErrorKind::NotOwner,
                    AccessError::InvalidOwner => ErrorKind::InvalidOwner,
                }
            }
            HydroError::Discount(DiscountError::InvalidConfig(_)) => ErrorKind::InvalidConfig,
            HydroError::Registry(_) | HydroError::Config(_) => ErrorKind::InvalidConfig,
            HydroError::Metrics(_) => ErrorKind::Internal,
        }
    }

    /// Short, stable identifier for programmatic dispatch.
    pub fn code(&self) -> &'static str {
        match self {
            HydroError::Ledger(LedgerError::Adapter { op, .. }) => match op {
                LedgerOp::Withdraw => "TOKEN_TRANSFER_ERROR",
                LedgerOp::Deposit | LedgerOp::Transfer => "TOKEN_TRANSFER_FROM_ERROR",
            },
            HydroError::Ledger(LedgerError::InsufficientBalance { op, .. }) => match op {
                LedgerOp::Transfer => "TRANSFER_BALANCE_NOT_ENOUGH",
                LedgerOp::Deposit | LedgerOp::Withdraw => "BALANCE_NOT_ENOUGH",
            },
            HydroError::Ledger(LedgerError::InvalidCategory(_)) => "INVALID_BALANCE_CATEGORY",
            HydroError::Registry(_) => "INVALID_ASSET",
            _ => match self.kind() {
                ErrorKind::ValueMismatch => "MSG_VALUE_AND_AMOUNT_MISMATCH",
                ErrorKind::TokenTransferFailed => "TOKEN_TRANSFER_FROM_ERROR",
                ErrorKind::InsufficientBalance => "BALANCE_NOT_ENOUGH",
                ErrorKind::NotOwner => "NOT_OWNER",
                ErrorKind::InvalidConfig => "INVALID_CONFIG",
                ErrorKind::BalanceOverflow => "BALANCE_OVERFLOW",
                ErrorKind::InvalidOwner => "INVALID_OWNER",
                ErrorKind::Internal => "INTERNAL_ERROR",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_protocol::asset::TransferError;
    use hydro_protocol::discount::CodecError;
    use hydro_protocol::{Address, Asset};

    use crate::ledger::BalancePath;

    fn shortfall(op: LedgerOp) -> HydroError {
        LedgerError::InsufficientBalance {
            op,
            asset: Asset::NATIVE,
            path: BalancePath::common(Address::derive("a")),
            available: 1,
            requested: 2,
        }
        .into()
    }

    fn refused(op: LedgerOp) -> HydroError {
        LedgerError::Adapter {
            op,
            source: AdapterError::TransferInFailed {
                asset: Asset::NATIVE,
                reason: TransferError::Rejected("no".into()),
            },
        }
        .into()
    }

    #[test]
    fn codes_depend_on_operation() {
        assert_eq!(shortfall(LedgerOp::Withdraw).code(), "BALANCE_NOT_ENOUGH");
        assert_eq!(shortfall(LedgerOp::Transfer).code(), "TRANSFER_BALANCE_NOT_ENOUGH");
        assert_eq!(refused(LedgerOp::Deposit).code(), "TOKEN_TRANSFER_FROM_ERROR");
        assert_eq!(refused(LedgerOp::Withdraw).code(), "TOKEN_TRANSFER_ERROR");
        assert_eq!(refused(LedgerOp::Withdraw).kind(), ErrorKind::TokenTransferFailed);
    }

    #[test]
    fn access_errors_map_through_discount() {
        let caller = Address::derive("mallory");
        let err: HydroError = DiscountError::from(AccessError::NotOwner { caller }).into();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        assert_eq!(err.code(), "NOT_OWNER");

        let err: HydroError = AccessError::InvalidOwner.into();
        assert_eq!(err.code(), "INVALID_OWNER");
    }

    #[test]
    fn decode_failures_are_invalid_config() {
        let err: HydroError = DiscountError::from(CodecError::UnsupportedVersion(2)).into();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.code(), "INVALID_CONFIG");
    }

    #[test]
    fn value_mismatch_code() {
        let err: HydroError = LedgerError::ValueMismatch {
            amount: 1,
            provided: 0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ValueMismatch);
        assert_eq!(err.code(), "MSG_VALUE_AND_AMOUNT_MISMATCH");
        assert!(err.to_string().contains("does not match"));
    }
}
