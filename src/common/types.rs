//! Exchange-facing types shared by the gateway and the reconciler

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side that opens a position in the direction of `signed_size`.
    /// Returns `None` for zero.
    pub fn from_signed(signed_size: Decimal) -> Option<Self> {
        if signed_size > Decimal::ZERO {
            Some(Side::Buy)
        } else if signed_size < Decimal::ZERO {
            Some(Side::Sell)
        } else {
            None
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an opening order is submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Market,
    /// GTC limit at the current price
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current exchange state for one symbol
///
/// The side is derived from the sign of `signed_amount`, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub symbol: String,
    /// Positive = long, negative = short, zero = flat
    pub signed_amount: Decimal,
    pub leverage: u32,
}

impl PositionState {
    pub fn new(symbol: impl Into<String>, signed_amount: Decimal, leverage: u32) -> Self {
        Self {
            symbol: symbol.into(),
            signed_amount,
            leverage,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.signed_amount.is_zero()
    }

    /// Side of the order that opened this position, `None` when flat
    pub fn side(&self) -> Option<Side> {
        Side::from_signed(self.signed_amount)
    }

    pub fn quantity(&self) -> Decimal {
        self.signed_amount.abs()
    }
}

/// Quantity and price constraints the exchange enforces for a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFilters {
    pub symbol: String,
    /// Quantities must be a multiple of this
    pub step_size: Decimal,
    /// Smallest tradable quantity
    pub min_qty: Decimal,
    /// Prices must be a multiple of this
    pub tick_size: Decimal,
}

impl SymbolFilters {
    /// Round a price down to the tick size
    pub fn round_price(&self, price: Decimal) -> Decimal {
        round_down_to_step(price, self.tick_size)
    }
}

/// Round `value` down to the nearest multiple of `step`.
///
/// A non-positive step leaves the value untouched.
pub fn round_down_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    ((value / step).floor() * step).normalize()
}

/// Outcome of a submitted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub symbol: String,
    pub side: Side,
    pub order_id: i64,
    pub status: String,
    pub executed_quantity: Decimal,
    /// Average fill price, or the last known price when not yet filled
    pub fill_price: Decimal,
    /// Effective leverage, when known
    pub leverage: Option<u32>,
}

/// Acknowledged leverage change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageChange {
    pub symbol: String,
    pub leverage: u32,
}
