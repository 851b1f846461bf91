//! # Discount Tier Table
//!
//! Fee discounts derived live from a user's Hydro token holdings. The rate is
//! recomputed on every lookup from the current token balance, so a discount
//! changes as soon as holdings cross a tier boundary and there is no cached
//! state to go stale.
//!
//! Only the owner may replace the table, and it is always replaced whole.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use hydro_protocol::asset::TokenContract;
use hydro_protocol::discount::{CodecError, DiscountConfig, PackedDiscountConfig};
use hydro_protocol::Address;

use crate::ownable::{AccessError, Ownable};

/// Errors from reconfiguring the discount table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscountError {
    /// The caller failed the owner gate.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The packed configuration did not decode.
    #[error("invalid discount config: {0}")]
    InvalidConfig(#[from] CodecError),
}

/// The live discount table.
pub struct DiscountTierTable {
    hydro_token: Address,
    token: Arc<dyn TokenContract>,
    decimals: u8,
    config: DiscountConfig,
}

impl DiscountTierTable {
    /// Creates the table. `hydro_token` is fixed for the table's lifetime.
    pub fn new(
        hydro_token: Address,
        token: Arc<dyn TokenContract>,
        decimals: u8,
        config: DiscountConfig,
    ) -> Self {
        Self {
            hydro_token,
            token,
            decimals,
            config,
        }
    }

    /// Replaces the whole table with `packed`.
    ///
    /// The owner check runs before decoding, so a non-owner learns nothing
    /// about whether their payload was valid.
    pub fn change_discount_config(
        &mut self,
        access: &Ownable,
        caller: Address,
        packed: &PackedDiscountConfig,
    ) -> Result<(), DiscountError> {
        access.ensure_owner(caller)?;
        let config = packed.decode()?;
        self.config = config;
        info!(%caller, config = %packed, "discount config changed");
        Ok(())
    }

    /// Percentage of the fee `user` still pays, in `[0, 100]`.
    pub fn get_discounted_rate(&self, user: Address) -> u16 {
        let balance = self.token.balance_of(user);
        let rate = self.config.rate_for_balance(balance, self.decimals);
        debug!(%user, balance, rate, "discounted rate");
        rate
    }

    pub fn get_hydro_token_address(&self) -> Address {
        self.hydro_token
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// The current table.
    pub fn discount_config(&self) -> &DiscountConfig {
        &self.config
    }

    /// The current table in its packed form.
    pub fn packed_discount_config(&self) -> PackedDiscountConfig {
        self.config.encode()
    }
}

impl std::fmt::Debug for DiscountTierTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscountTierTable")
            .field("hydro_token", &self.hydro_token)
            .field("decimals", &self.decimals)
            .field("config", &self.config)
            .finish()
    }
}
