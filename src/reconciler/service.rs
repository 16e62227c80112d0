//! Read-decide-execute for one signal, serialized per symbol

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::common::errors::ReconcileError;
use crate::common::locks::SymbolLocks;
use crate::common::traits::ExchangeGateway;
use crate::config::types::TradingConfig;

use super::executor::{ExecutionReport, PlanExecutor};
use super::plan::reconcile;
use super::sizing::{FullBalanceSizer, SizeCalculator};
use super::types::DesiredSignal;

/// Entry point for reconciling signals against an exchange.
///
/// Cheap to clone; clones share the gateway and the symbol lock registry.
#[derive(Clone)]
pub struct ReconciliationService {
    gateway: Arc<dyn ExchangeGateway>,
    sizer: Arc<dyn SizeCalculator>,
    trading: TradingConfig,
    locks: SymbolLocks,
}

impl ReconciliationService {
    pub fn new(gateway: Arc<dyn ExchangeGateway>, trading: TradingConfig) -> Self {
        Self {
            gateway,
            sizer: Arc::new(FullBalanceSizer),
            trading,
            locks: SymbolLocks::new(),
        }
    }

    /// Replace the default full-balance sizing policy
    pub fn with_sizer(mut self, sizer: Arc<dyn SizeCalculator>) -> Self {
        self.sizer = sizer;
        self
    }

    pub fn trading(&self) -> &TradingConfig {
        &self.trading
    }

    /// Reconcile one signal.
    ///
    /// Returns `Err` only when nothing was attempted (the position read
    /// failed). Failures during execution are reported in the returned
    /// report alongside the steps that completed.
    #[instrument(skip(self, signal), fields(symbol = %signal.symbol, target = %signal.target_signed_size))]
    pub async fn handle(&self, signal: &DesiredSignal) -> Result<ExecutionReport, ReconcileError> {
        let _guard = self.locks.acquire(&signal.symbol).await;

        if let Some(comment) = &signal.comment {
            info!(comment = %comment, "Signal received");
        }

        let leverage = self.trading.configured_leverage();
        let current = self.gateway.get_position(&signal.symbol).await?;
        info!(
            venue = self.gateway.venue_name(),
            position = ?current,
            configured_leverage = leverage,
            "Current position"
        );

        let plan = reconcile(
            current.as_ref(),
            signal,
            leverage,
            self.trading.order_type,
        );
        info!(operations = ?plan.operations, "Reconciliation plan");

        let executor = PlanExecutor::new(
            self.gateway.as_ref(),
            self.sizer.as_ref(),
            &self.trading.quote_asset,
        );
        let mut report = executor.execute(&signal.symbol, &plan).await;

        if plan.is_empty() {
            report.note = Some("position already matches signal; no action taken".to_string());
            match self
                .gateway
                .get_available_balance(&self.trading.quote_asset)
                .await
            {
                Ok(balance) => {
                    info!(%balance, asset = %self.trading.quote_asset, "No action needed");
                    report.available_balance = Some(balance);
                }
                Err(e) => warn!(error = %e, "Could not read balance for no-op report"),
            }
        }

        Ok(report)
    }
}
