//! Trait definitions for exchange gateways

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{LeverageChange, OrderResult, OrderType, PositionState, Side, SymbolFilters};

/// Capability interface the reconciler uses to read and change account state.
///
/// Every call is a network round trip and may fail. Implementations hold no
/// cached position state: each call reflects the exchange at that moment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Current position for a symbol, `None` when the exchange reports nothing
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionState>>;

    /// Balance available for new margin in `asset`
    async fn get_available_balance(&self, asset: &str) -> Result<Decimal>;

    /// Latest traded price
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal>;

    /// Quantity step, minimum quantity and tick size for a symbol
    async fn get_symbol_filters(&self, symbol: &str) -> Result<SymbolFilters>;

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<LeverageChange>;

    /// Submit a reduce-only order on `side` for `quantity`
    async fn close_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult>;

    async fn open_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        leverage: u32,
        order_type: OrderType,
    ) -> Result<OrderResult>;

    /// Name of the venue, for logs
    fn venue_name(&self) -> &'static str;
}
