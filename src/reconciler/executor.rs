//! Runs a reconciliation plan against a gateway, stopping at the first failure

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::common::errors::ReconcileError;
use crate::common::traits::ExchangeGateway;
use crate::common::types::{LeverageChange, OrderResult};

use super::sizing::SizeCalculator;
use super::types::{Operation, OrderQuantity, ReconciliationPlan};

/// Result of a successful step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum StepResult {
    Closed(OrderResult),
    LeverageSet(LeverageChange),
    Opened(OrderResult),
}

/// An executed operation, with any quantity resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub operation: Operation,
    pub result: StepResult,
}

/// The operation that stopped the plan and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailure {
    pub operation: Operation,
    pub kind: String,
    pub message: String,
}

impl StepFailure {
    fn new(operation: Operation, err: &ReconcileError) -> Self {
        Self {
            operation,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Summary of one reconciliation
///
/// `steps` lists only operations that succeeded. When `failure` is set,
/// those steps remain in effect and nothing after the failing operation was
/// attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub symbol: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Quote balance, reported when nothing had to change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_balance: Option<Decimal>,
}

impl ExecutionReport {
    fn begin(symbol: &str) -> Self {
        let now = Utc::now();
        Self {
            symbol: symbol.to_string(),
            started_at: now,
            finished_at: now,
            steps: Vec::new(),
            failure: None,
            note: None,
            available_balance: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of operations attempted, including a failed one
    pub fn attempted(&self) -> usize {
        self.steps.len() + usize::from(self.failure.is_some())
    }
}

/// Executes plans sequentially. Holds no state between plans.
pub struct PlanExecutor<'a> {
    gateway: &'a dyn ExchangeGateway,
    sizer: &'a dyn SizeCalculator,
    quote_asset: &'a str,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(
        gateway: &'a dyn ExchangeGateway,
        sizer: &'a dyn SizeCalculator,
        quote_asset: &'a str,
    ) -> Self {
        Self {
            gateway,
            sizer,
            quote_asset,
        }
    }

    /// Run `plan` for `symbol`. Never undoes completed steps.
    pub async fn execute(&self, symbol: &str, plan: &ReconciliationPlan) -> ExecutionReport {
        let mut report = ExecutionReport::begin(symbol);

        for operation in plan.iter() {
            // A failure after sizing reports the quantity that was submitted
            let (operation, outcome) = match self.resolve(operation).await {
                Ok(resolved) => {
                    let result = self.submit(&resolved).await;
                    (resolved, result)
                }
                Err(err) => (operation.clone(), Err(err)),
            };

            match outcome {
                Ok(result) => {
                    info!(
                        symbol,
                        operation = operation.name(),
                        result = ?result,
                        "Step completed"
                    );
                    report.steps.push(StepOutcome { operation, result });
                }
                Err(err) => {
                    error!(
                        symbol,
                        operation = operation.name(),
                        kind = err.kind(),
                        error = %err,
                        completed = report.steps.len(),
                        "Step failed, aborting plan"
                    );
                    report.failure = Some(StepFailure::new(operation, &err));
                    break;
                }
            }
        }

        report.finished_at = Utc::now();
        report
    }

    /// Replace a balance-sized open with the exact quantity to submit
    async fn resolve(&self, operation: &Operation) -> Result<Operation, ReconcileError> {
        match operation {
            Operation::OpenPosition {
                symbol,
                side,
                quantity,
                leverage,
                order_type,
            } => Ok(Operation::OpenPosition {
                symbol: symbol.clone(),
                side: *side,
                quantity: OrderQuantity::Exact(self.resolve_quantity(symbol, *quantity).await?),
                leverage: *leverage,
                order_type: *order_type,
            }),
            other => Ok(other.clone()),
        }
    }

    async fn submit(&self, operation: &Operation) -> Result<StepResult, ReconcileError> {
        let result = match operation {
            Operation::ClosePosition {
                symbol,
                side,
                quantity,
                leverage,
            } => {
                let mut order = self.gateway.close_position(symbol, *side, *quantity).await?;
                order.leverage = order.leverage.or(Some(*leverage));
                StepResult::Closed(order)
            }
            Operation::SetLeverage { symbol, leverage } => {
                StepResult::LeverageSet(self.gateway.set_leverage(symbol, *leverage).await?)
            }
            Operation::OpenPosition {
                symbol,
                side,
                quantity,
                leverage,
                order_type,
            } => {
                let quantity = self.resolve_quantity(symbol, *quantity).await?;
                StepResult::Opened(
                    self.gateway
                        .open_position(symbol, *side, quantity, *leverage, *order_type)
                        .await?,
                )
            }
        };
        Ok(result)
    }

    async fn resolve_quantity(
        &self,
        symbol: &str,
        quantity: OrderQuantity,
    ) -> Result<Decimal, ReconcileError> {
        match quantity {
            OrderQuantity::Exact(q) => Ok(q),
            OrderQuantity::AllAvailableBalance => {
                let balance = self.gateway.get_available_balance(self.quote_asset).await?;
                let price = self.gateway.get_current_price(symbol).await?;
                let filters = self.gateway.get_symbol_filters(symbol).await?;

                let sized = self.sizer.compute_quantity(symbol, balance, price, &filters);
                match &sized {
                    Ok(q) => info!(symbol, %balance, %price, quantity = %q, "Sized opening order"),
                    Err(e) => warn!(symbol, %balance, %price, error = %e, "Sizing failed"),
                }
                sized
            }
        }
    }
}
