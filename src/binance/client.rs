//! Binance futures gateway built on the REST client

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, instrument};

use super::messages::{OrderResponse, PositionRiskResponse, SymbolFilter, SymbolInfo};
use super::rest::{parse_decimal, BinanceRestClient, NewOrder};
use crate::common::errors::{GatewayError, Result};
use crate::common::traits::ExchangeGateway;
use crate::common::types::{
    LeverageChange, OrderResult, OrderType, PositionState, Side, SymbolFilters,
};
use crate::config::types::BinanceConfig;

/// Exchange gateway for Binance USD-M futures (one-way position mode)
#[derive(Debug, Clone)]
pub struct BinanceFuturesClient {
    rest_client: BinanceRestClient,
}

impl BinanceFuturesClient {
    /// Create a new client from configuration
    pub fn new(config: &BinanceConfig) -> Result<Self> {
        let credentials = config.credentials().ok_or_else(|| {
            GatewayError::Configuration(
                "BINANCE_API_KEY and BINANCE_API_SECRET must both be set".to_string(),
            )
        })?;

        let rest_client = BinanceRestClient::with_timeout(
            config.rest_base_url(),
            credentials,
            Duration::from_secs(config.request_timeout_seconds),
        )?
        .with_recv_window(config.recv_window_ms);

        Ok(Self { rest_client })
    }

    /// Wrap an existing REST client
    pub fn from_rest(rest_client: BinanceRestClient) -> Self {
        Self { rest_client }
    }

    /// Get a reference to the REST client
    pub fn rest(&self) -> &BinanceRestClient {
        &self.rest_client
    }

    /// Build an `OrderResult`, falling back to the ticker when the order
    /// carries no fill price yet.
    async fn order_result(&self, order: OrderResponse, leverage: Option<u32>) -> Result<OrderResult> {
        let side = match order.side.as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => {
                return Err(GatewayError::InvalidResponse(format!(
                    "Unknown order side: {}",
                    other
                )))
            }
        };

        let mut fill_price = first_non_zero(&[order.avg_price.as_deref(), order.price.as_deref()])?;
        if fill_price.is_zero() {
            fill_price = self.rest_client.get_ticker_price(&order.symbol).await?;
        }

        Ok(OrderResult {
            executed_quantity: parse_decimal("executedQty", &order.executed_qty)?,
            symbol: order.symbol,
            side,
            order_id: order.order_id,
            status: order.status,
            fill_price,
            leverage,
        })
    }
}

/// First non-zero decimal among optional string fields, or zero
fn first_non_zero(values: &[Option<&str>]) -> Result<Decimal> {
    for value in values.iter().flatten() {
        let parsed = parse_decimal("price", value)?;
        if !parsed.is_zero() {
            return Ok(parsed);
        }
    }
    Ok(Decimal::ZERO)
}

/// Convert the one-way (`BOTH`) position entry into a `PositionState`
fn position_from_risk(entries: Vec<PositionRiskResponse>) -> Result<Option<PositionState>> {
    let Some(entry) = entries
        .into_iter()
        .find(|p| p.position_side == "BOTH")
    else {
        return Ok(None);
    };

    let leverage = entry.leverage.parse::<u32>().map_err(|e| {
        GatewayError::InvalidResponse(format!("Invalid leverage '{}': {}", entry.leverage, e))
    })?;

    Ok(Some(PositionState {
        signed_amount: parse_decimal("positionAmt", &entry.position_amt)?,
        symbol: entry.symbol,
        leverage,
    }))
}

/// Extract sizing constraints from exchange info.
///
/// `MARKET_LOT_SIZE` is preferred over `LOT_SIZE` when present since opens
/// default to market orders.
fn filters_from_info(info: SymbolInfo) -> Result<SymbolFilters> {
    let mut lot: Option<(String, String)> = None;
    let mut market_lot: Option<(String, String)> = None;
    let mut tick_size = Decimal::ZERO;

    for filter in info.filters {
        match filter {
            SymbolFilter::LotSize {
                min_qty, step_size, ..
            } => lot = Some((min_qty, step_size)),
            SymbolFilter::MarketLotSize {
                min_qty, step_size, ..
            } => market_lot = Some((min_qty, step_size)),
            SymbolFilter::PriceFilter { tick_size: t, .. } => {
                tick_size = parse_decimal("tickSize", &t)?
            }
            SymbolFilter::Other => {}
        }
    }

    let (min_qty, step_size) = market_lot
        .filter(|(_, step)| parse_decimal("stepSize", step).map(|s| !s.is_zero()).unwrap_or(false))
        .or(lot)
        .ok_or_else(|| {
            GatewayError::InvalidResponse(format!("No lot size filter for {}", info.symbol))
        })?;

    Ok(SymbolFilters {
        symbol: info.symbol,
        step_size: parse_decimal("stepSize", &step_size)?,
        min_qty: parse_decimal("minQty", &min_qty)?,
        tick_size,
    })
}

#[async_trait]
impl ExchangeGateway for BinanceFuturesClient {
    #[instrument(skip(self))]
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionState>> {
        let entries = self.rest_client.get_position_risk(symbol).await?;
        position_from_risk(entries)
    }

    #[instrument(skip(self))]
    async fn get_available_balance(&self, asset: &str) -> Result<Decimal> {
        let balances = self.rest_client.get_balances().await?;
        match balances.into_iter().find(|b| b.asset == asset) {
            Some(balance) => parse_decimal("availableBalance", &balance.available_balance),
            None => Ok(Decimal::ZERO),
        }
    }

    #[instrument(skip(self))]
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal> {
        self.rest_client.get_ticker_price(symbol).await
    }

    #[instrument(skip(self))]
    async fn get_symbol_filters(&self, symbol: &str) -> Result<SymbolFilters> {
        let info = self.rest_client.get_symbol_info(symbol).await?;
        filters_from_info(info)
    }

    #[instrument(skip(self))]
    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<LeverageChange> {
        let response = self.rest_client.change_leverage(symbol, leverage).await?;
        info!(symbol = %response.symbol, leverage = response.leverage, "Leverage changed");
        Ok(LeverageChange {
            symbol: response.symbol,
            leverage: response.leverage,
        })
    }

    #[instrument(skip(self))]
    async fn close_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult> {
        let order = self
            .rest_client
            .new_order(&NewOrder {
                symbol,
                side,
                order_type: OrderType::Market,
                quantity,
                price: None,
                reduce_only: true,
            })
            .await?;
        self.order_result(order, None).await
    }

    #[instrument(skip(self))]
    async fn open_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        leverage: u32,
        order_type: OrderType,
    ) -> Result<OrderResult> {
        let price = match order_type {
            OrderType::Market => None,
            OrderType::Limit => {
                let filters = self.get_symbol_filters(symbol).await?;
                let last = self.rest_client.get_ticker_price(symbol).await?;
                Some(filters.round_price(last))
            }
        };

        let order = self
            .rest_client
            .new_order(&NewOrder {
                symbol,
                side,
                order_type,
                quantity,
                price,
                reduce_only: false,
            })
            .await?;
        self.order_result(order, Some(leverage)).await
    }

    fn venue_name(&self) -> &'static str {
        "binance-usdm"
    }
}
