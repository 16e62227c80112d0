use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::ReconcileError;
use crate::common::types::{OrderType, Side};

/// Desired net position for one symbol
///
/// Only the sign of `target_signed_size` drives the plan; the order quantity
/// is sized from the available balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredSignal {
    pub symbol: String,
    /// Positive = long, negative = short, zero = flat
    pub target_signed_size: Decimal,
    /// Free-form annotation from the signal source
    #[serde(default)]
    pub comment: Option<String>,
}

impl DesiredSignal {
    /// Build a validated signal. The symbol is trimmed and upper-cased.
    pub fn new(
        symbol: impl AsRef<str>,
        target_signed_size: Decimal,
    ) -> Result<Self, ReconcileError> {
        let symbol = symbol.as_ref().trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ReconcileError::InvalidSignal("symbol must not be empty".into()));
        }
        // Delivery contracts carry an underscore and some perpetuals are
        // non-ASCII; unknown symbols are left for the exchange to reject.
        if !symbol.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ReconcileError::InvalidSignal(format!(
                "symbol '{}' contains invalid characters",
                symbol
            )));
        }
        Ok(Self {
            symbol,
            target_signed_size,
            comment: None,
        })
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Side requested by the signal, `None` when it asks for flat
    pub fn side(&self) -> Option<Side> {
        Side::from_signed(self.target_signed_size)
    }
}

/// Quantity of an opening order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum OrderQuantity {
    /// Sized from the whole available balance when the order is submitted
    AllAvailableBalance,
    Exact(Decimal),
}

/// A single exchange operation in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Reduce-only order flattening the current position
    ClosePosition {
        symbol: String,
        /// Side of the closing order, opposite to the position
        side: Side,
        quantity: Decimal,
        /// Leverage the position was held at
        leverage: u32,
    },
    SetLeverage {
        symbol: String,
        leverage: u32,
    },
    OpenPosition {
        symbol: String,
        side: Side,
        quantity: OrderQuantity,
        leverage: u32,
        order_type: OrderType,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ClosePosition { .. } => "close_position",
            Operation::SetLeverage { .. } => "set_leverage",
            Operation::OpenPosition { .. } => "open_position",
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Operation::ClosePosition { symbol, .. }
            | Operation::SetLeverage { symbol, .. }
            | Operation::OpenPosition { symbol, .. } => symbol,
        }
    }
}

/// Ordered operations bringing an account to the desired state
///
/// Holds at most one close, one leverage change and one open, in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub operations: Vec<Operation>,
}

impl ReconciliationPlan {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn closes(&self) -> usize {
        self.count(|op| matches!(op, Operation::ClosePosition { .. }))
    }

    pub fn opens(&self) -> usize {
        self.count(|op| matches!(op, Operation::OpenPosition { .. }))
    }

    pub fn leverage_changes(&self) -> usize {
        self.count(|op| matches!(op, Operation::SetLeverage { .. }))
    }

    fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.operations.iter().filter(|op| pred(op)).count()
    }
}
