//! # Prometheus Metrics
//!
//! Operational counters for a [`Hydro`](crate::hydro::Hydro) instance. Every
//! metric lives in a dedicated [`prometheus::Registry`] with the `hydro`
//! prefix, so several instances (or tests) never collide on the default
//! global registry.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::ledger::LedgerOp;

/// Metric handles for one settlement instance.
///
/// Cloning is cheap; prometheus handles are reference counted.
#[derive(Clone)]
pub struct LedgerMetrics {
    registry: Registry,
    /// Successful deposits.
    pub deposits_total: IntCounter,
    /// Successful withdrawals.
    pub withdrawals_total: IntCounter,
    /// Successful internal transfers.
    pub transfers_total: IntCounter,
    /// Accepted discount table replacements.
    pub discount_config_changes_total: IntCounter,
    /// Number of tiers in the current discount table.
    pub discount_tiers_active: IntGauge,
    /// Rejected calls, labeled by error code.
    pub rejected_total: IntCounterVec,
}

impl LedgerMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("hydro".into()), None)?;

        let deposits_total = IntCounter::new("deposits_total", "Successful deposits")?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total = IntCounter::new("withdrawals_total", "Successful withdrawals")?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let transfers_total =
            IntCounter::new("transfers_total", "Successful internal balance transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let discount_config_changes_total = IntCounter::new(
            "discount_config_changes_total",
            "Accepted discount tier table replacements",
        )?;
        registry.register(Box::new(discount_config_changes_total.clone()))?;

        let discount_tiers_active = IntGauge::new(
            "discount_tiers_active",
            "Tiers in the current discount table",
        )?;
        registry.register(Box::new(discount_tiers_active.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new("rejected_total", "Rejected calls by error code"),
            &["code"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        Ok(Self {
            registry,
            deposits_total,
            withdrawals_total,
            transfers_total,
            discount_config_changes_total,
            discount_tiers_active,
            rejected_total,
        })
    }

    /// Counts one successful ledger operation.
    pub fn record_op(&self, op: LedgerOp) {
        match op {
            LedgerOp::Deposit => self.deposits_total.inc(),
            LedgerOp::Withdraw => self.withdrawals_total.inc(),
            LedgerOp::Transfer => self.transfers_total.inc(),
        }
    }

    /// Counts one rejected call.
    pub fn record_rejection(&self, code: &str) {
        self.rejected_total.with_label_values(&[code]).inc();
    }

    /// Rejections recorded so far for `code`.
    pub fn rejections(&self, code: &str) -> u64 {
        self.rejected_total.with_label_values(&[code]).get()
    }

    /// Renders every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for LedgerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerMetrics")
            .field("deposits_total", &self.deposits_total.get())
            .field("withdrawals_total", &self.withdrawals_total.get())
            .field("transfers_total", &self.transfers_total.get())
            .finish_non_exhaustive()
    }
}
