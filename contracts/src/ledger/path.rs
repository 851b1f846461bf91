//! Balance categories and paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use hydro_protocol::{Address, MarketId};

use super::LedgerError;

/// Which bucket of a user's funds a balance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BalanceCategory {
    /// Free balance, not tied to any market.
    Common = 0,
    /// Collateral committed to one market.
    CollateralAccount = 1,
}

impl TryFrom<u8> for BalanceCategory {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BalanceCategory::Common),
            1 => Ok(BalanceCategory::CollateralAccount),
            other => Err(LedgerError::InvalidCategory(other)),
        }
    }
}

impl From<BalanceCategory> for u8 {
    fn from(category: BalanceCategory) -> Self {
        category as u8
    }
}

impl fmt::Display for BalanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceCategory::Common => write!(f, "Common"),
            BalanceCategory::CollateralAccount => write!(f, "CollateralAccount"),
        }
    }
}

/// `(category, market_id, user)`: the bucket a balance lives in.
///
/// `market_id` only means something for collateral accounts. Two `Common`
/// paths for the same user address the same balance whatever their
/// `market_id`; see [`BalancePath::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalancePath {
    pub category: BalanceCategory,
    #[serde(rename = "marketID")]
    pub market_id: MarketId,
    pub user: Address,
}

impl BalancePath {
    /// The common balance of `user`.
    pub fn common(user: Address) -> Self {
        Self {
            category: BalanceCategory::Common,
            market_id: 0,
            user,
        }
    }

    /// The collateral account of `user` in `market_id`.
    pub fn collateral(market_id: MarketId, user: Address) -> Self {
        Self {
            category: BalanceCategory::CollateralAccount,
            market_id,
            user,
        }
    }

    /// Builds a path from its raw parts, as they arrive over the wire.
    pub fn from_raw(category: u8, market_id: MarketId, user: Address) -> Result<Self, LedgerError> {
        Ok(Self {
            category: BalanceCategory::try_from(category)?,
            market_id,
            user,
        })
    }

    /// The canonical storage form: `market_id` forced to zero for `Common`.
    pub fn normalized(&self) -> Self {
        match self.category {
            BalanceCategory::Common => Self::common(self.user),
            BalanceCategory::CollateralAccount => *self,
        }
    }
}

impl fmt::Display for BalancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            BalanceCategory::Common => write!(f, "{}/{}", self.category, self.user),
            BalanceCategory::CollateralAccount => {
                write!(f, "{}[{}]/{}", self.category, self.market_id, self.user)
            }
        }
    }
}
