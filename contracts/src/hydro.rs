//! # Hydro
//!
//! The settlement entry point. [`Hydro`] owns the ledger, the discount table
//! and the owner gate behind one mutex: every public call runs to completion,
//! fully applied or fully rejected, before the next one starts.
//!
//! Calls that carry native value take a [`CallContext`]; everything else
//! takes the caller's address. Successful mutations queue [`HydroEvent`]s,
//! drained with [`Hydro::take_events`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use hydro_protocol::asset::{AssetRegistry, NativeCurrency, TokenContract};
use hydro_protocol::config::HydroConfig;
use hydro_protocol::discount::{DiscountConfig, PackedDiscountConfig};
use hydro_protocol::{Address, Amount, Asset, MarketId};

use crate::discount::DiscountTierTable;
use crate::error::HydroError;
use crate::events::HydroEvent;
use crate::ledger::{BalanceLedger, BalancePath, LedgerOp};
use crate::metrics::LedgerMetrics;
use crate::ownable::Ownable;

/// The host message a call arrives with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account making the call.
    pub sender: Address,
    /// Native value attached to the call.
    pub value: Amount,
}

impl CallContext {
    /// A call with no value attached.
    pub fn new(sender: Address) -> Self {
        Self { sender, value: 0 }
    }

    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

struct State {
    ledger: BalanceLedger,
    discount: DiscountTierTable,
    access: Ownable,
    events: Vec<HydroEvent>,
}

/// A settlement instance.
pub struct Hydro {
    state: Mutex<State>,
    metrics: LedgerMetrics,
}

impl Hydro {
    /// Builds an instance from a validated deployment config.
    ///
    /// `custody` is the account that holds every deposited asset, `native`
    /// the native currency, and `hydro_token` the contract at
    /// `config.hydro_token`. The Hydro token is also registered as a
    /// depositable asset.
    pub fn new(
        config: &HydroConfig,
        custody: Address,
        native: Arc<dyn NativeCurrency>,
        hydro_token: Arc<dyn TokenContract>,
    ) -> Result<Self, HydroError> {
        config.validate()?;
        let initial = config.initial_discount_config()?;

        let mut registry = AssetRegistry::new(custody, native);
        registry
            .register_token(config.hydro_token, hydro_token.clone())
            .map_err(HydroError::Registry)?;

        let metrics = LedgerMetrics::new()?;
        metrics
            .discount_tiers_active
            .set(initial.active_tiers().count() as i64);

        tracing::info!(
            owner = %config.owner,
            hydro_token = %config.hydro_token,
            %custody,
            "hydro instance created"
        );

        Ok(Self {
            state: Mutex::new(State {
                ledger: BalanceLedger::new(registry),
                discount: DiscountTierTable::new(
                    config.hydro_token,
                    hydro_token,
                    config.hydro_token_decimals,
                    initial,
                ),
                access: Ownable::new(config.owner),
                events: Vec::new(),
            }),
            metrics,
        })
    }

    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    /// Counts and logs a rejected call, passing the error through.
    fn rejected(&self, call: &'static str, err: HydroError) -> HydroError {
        let code = err.code();
        self.metrics.record_rejection(code);
        warn!(call, code, error = %err, "call rejected");
        err
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    /// Deposits `amount` of `asset` for `ctx.sender`. For the native
    /// currency `ctx.value` must equal `amount`; for tokens it must be zero.
    pub fn deposit(
        &self,
        ctx: CallContext,
        asset: Asset,
        amount: Amount,
    ) -> Result<(), HydroError> {
        let mut state = self.state.lock();
        match state.ledger.deposit(ctx.sender, asset, amount, ctx.value) {
            Ok(_) => {
                state.events.push(HydroEvent::Deposit {
                    asset,
                    user: ctx.sender,
                    amount,
                });
                self.metrics.record_op(LedgerOp::Deposit);
                Ok(())
            }
            Err(err) => Err(self.rejected("deposit", err.into())),
        }
    }

    /// Plain value sent with no call data: a native deposit of `ctx.value`.
    pub fn receive(&self, ctx: CallContext) -> Result<(), HydroError> {
        self.deposit(ctx, Asset::NATIVE, ctx.value)
    }

    pub fn withdraw(
        &self,
        caller: Address,
        asset: Asset,
        amount: Amount,
    ) -> Result<(), HydroError> {
        let mut state = self.state.lock();
        match state.ledger.withdraw(caller, asset, amount) {
            Ok(_) => {
                state.events.push(HydroEvent::Withdraw {
                    asset,
                    user: caller,
                    amount,
                });
                self.metrics.record_op(LedgerOp::Withdraw);
                Ok(())
            }
            Err(err) => Err(self.rejected("withdraw", err.into())),
        }
    }

    /// Moves `amount` between two balance paths.
    ///
    /// There is no check on who is calling: deciding which paths a caller
    /// may move between belongs to the trading engine that drives this.
    pub fn transfer(
        &self,
        asset: Asset,
        from: BalancePath,
        to: BalancePath,
        amount: Amount,
    ) -> Result<(), HydroError> {
        let mut state = self.state.lock();
        match state.ledger.transfer(asset, &from, &to, amount) {
            Ok(()) => {
                state.events.push(HydroEvent::Transfer {
                    asset,
                    from: from.normalized(),
                    to: to.normalized(),
                    amount,
                });
                self.metrics.record_op(LedgerOp::Transfer);
                Ok(())
            }
            Err(err) => Err(self.rejected("transfer", err.into())),
        }
    }

    pub fn balance_of(&self, asset: Asset, user: Address) -> Amount {
        self.state.lock().ledger.balance_of(asset, user)
    }

    pub fn market_balance_of(&self, market_id: MarketId, asset: Asset, user: Address) -> Amount {
        self.state.lock().ledger.market_balance_of(market_id, asset, user)
    }

    pub fn balance_at(&self, asset: Asset, path: &BalancePath) -> Amount {
        self.state.lock().ledger.balance_at(asset, path)
    }

    pub fn total_balance(&self, asset: Asset) -> Option<Amount> {
        self.state.lock().ledger.total_balance(asset)
    }

    /// Owner-only: makes `address` depositable.
    pub fn register_token(
        &self,
        caller: Address,
        address: Address,
        contract: Arc<dyn TokenContract>,
    ) -> Result<Asset, HydroError> {
        let mut state = self.state.lock();
        if let Err(err) = state.access.ensure_owner(caller) {
            return Err(self.rejected("register_token", err.into()));
        }
        state
            .ledger
            .registry_mut()
            .register_token(address, contract)
            .map_err(|err| self.rejected("register_token", HydroError::Registry(err)))
    }

    pub fn is_registered(&self, asset: Asset) -> bool {
        self.state.lock().ledger.registry().is_registered(asset)
    }

    // -----------------------------------------------------------------------
    // Discounts
    // -----------------------------------------------------------------------

    /// Owner-only: replaces the discount table.
    pub fn change_discount_config(
        &self,
        caller: Address,
        packed: &PackedDiscountConfig,
    ) -> Result<(), HydroError> {
        let mut state = self.state.lock();
        let State {
            discount,
            access,
            events,
            ..
        } = &mut *state;
        match discount.change_discount_config(access, caller, packed) {
            Ok(()) => {
                let active = discount.discount_config().active_tiers().count();
                events.push(HydroEvent::DiscountConfigChanged { config: *packed });
                self.metrics.discount_config_changes_total.inc();
                self.metrics.discount_tiers_active.set(active as i64);
                Ok(())
            }
            Err(err) => Err(self.rejected("change_discount_config", err.into())),
        }
    }

    pub fn get_discounted_rate(&self, user: Address) -> u16 {
        self.state.lock().discount.get_discounted_rate(user)
    }

    pub fn get_hydro_token_address(&self) -> Address {
        self.state.lock().discount.get_hydro_token_address()
    }

    pub fn discount_config(&self) -> DiscountConfig {
        *self.state.lock().discount.discount_config()
    }

    pub fn packed_discount_config(&self) -> PackedDiscountConfig {
        self.state.lock().discount.packed_discount_config()
    }

    // -----------------------------------------------------------------------
    // Ownership
    // -----------------------------------------------------------------------

    pub fn owner(&self) -> Address {
        self.state.lock().access.owner()
    }

    pub fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), HydroError> {
        let mut state = self.state.lock();
        match state.access.transfer_ownership(caller, new_owner) {
            Ok(previous) => {
                state.events.push(HydroEvent::OwnershipTransferred {
                    previous,
                    owner: new_owner,
                });
                Ok(())
            }
            Err(err) => Err(self.rejected("transfer_ownership", err.into())),
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Drains the events emitted since the last call.
    pub fn take_events(&self) -> Vec<HydroEvent> {
        std::mem::take(&mut self.state.lock().events)
    }
}

impl std::fmt::Debug for Hydro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydro")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
