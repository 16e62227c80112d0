//! Position reconciliation
//!
//! ```text
//! signal ──► ReconciliationService::handle
//!              │  (per-symbol lock held throughout)
//!              ├─ gateway.get_position
//!              ├─ plan::reconcile            pure
//!              └─ PlanExecutor::execute      close → leverage → open
//!                    └─ SizeCalculator       sized right before the open
//! ```
//!
//! # Components
//!
//! - [`reconcile`]: decides the ordered [`Operation`]s for a signal
//! - [`SizeCalculator`]: turns balance and price into an order quantity
//! - [`PlanExecutor`]: runs a plan fail-fast and builds an [`ExecutionReport`]
//! - [`ReconciliationService`]: wires the above to a gateway

mod executor;
mod plan;
mod service;
mod sizing;
mod types;

pub use executor::{ExecutionReport, PlanExecutor, StepFailure, StepOutcome, StepResult};
pub use plan::reconcile;
pub use service::ReconciliationService;
pub use sizing::{FullBalanceSizer, SizeCalculator};
pub use types::{DesiredSignal, Operation, OrderQuantity, ReconciliationPlan};
