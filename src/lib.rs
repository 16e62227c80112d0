//! Futures position reconciler
//!
//! Takes a desired signed position for one symbol and brings a Binance USD-M
//! futures account into that state with the fewest operations: close,
//! leverage change, open.

pub mod api;
pub mod binance;
pub mod common;
pub mod config;
pub mod reconciler;

// Re-export commonly used types
pub use binance::BinanceFuturesClient;
pub use common::errors::{GatewayError, ReconcileError, Result};
pub use common::locks::{SymbolGuard, SymbolLocks};
pub use common::traits::ExchangeGateway;
pub use common::types::{
    LeverageChange, OrderResult, OrderType, PositionState, Side, SymbolFilters,
};
pub use config::types::AppConfig;
pub use reconciler::{
    reconcile, DesiredSignal, ExecutionReport, FullBalanceSizer, Operation, OrderQuantity,
    PlanExecutor, ReconciliationPlan, ReconciliationService, SizeCalculator, StepFailure,
    StepOutcome, StepResult,
};
