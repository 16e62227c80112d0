//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use futures_reconciler::common::errors::Result;
use futures_reconciler::config::types::TradingConfig;
use futures_reconciler::{
    ExchangeGateway, GatewayError, LeverageChange, OrderResult, OrderType, PositionState, Side,
    SymbolFilters,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;

pub const SYMBOL: &str = "BTCUSDT";

/// Trading config with a fixed leverage of 10 and market orders
pub fn trading_config() -> TradingConfig {
    TradingConfig {
        leverage: 10,
        order_type: OrderType::Market,
        quote_asset: "USDT".to_string(),
    }
}

pub fn btc_filters() -> SymbolFilters {
    SymbolFilters {
        symbol: SYMBOL.to_string(),
        step_size: dec!(0.001),
        min_qty: dec!(0.001),
        tick_size: dec!(0.1),
    }
}

#[derive(Debug, Default)]
struct State {
    positions: HashMap<String, PositionState>,
    /// Leverage set on symbols without a reported position
    leverages: HashMap<String, u32>,
    balance: Decimal,
    price: Decimal,
    calls: Vec<String>,
    fail_on: Option<&'static str>,
    next_order_id: i64,
}

/// In-memory exchange that applies orders to its own position book
#[derive(Debug, Default)]
pub struct FakeExchange {
    state: Mutex<State>,
}

impl FakeExchange {
    pub fn new(balance: Decimal, price: Decimal) -> Self {
        Self {
            state: Mutex::new(State {
                balance,
                price,
                ..Default::default()
            }),
        }
    }

    pub fn with_position(self, amount: Decimal, leverage: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .positions
            .insert(SYMBOL.to_string(), PositionState::new(SYMBOL, amount, leverage));
        self
    }

    /// Make the named gateway call fail with an exchange rejection
    pub fn fail_on(&self, call: &'static str) {
        self.state.lock().unwrap().fail_on = Some(call);
    }

    pub fn position(&self) -> Option<PositionState> {
        self.state.lock().unwrap().positions.get(SYMBOL).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Mutating calls only, in order
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c.as_str(), "set_leverage" | "close_position" | "open_position"))
            .collect()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        if state.fail_on == Some(call) {
            return Err(GatewayError::Api {
                code: -1000,
                message: format!("injected failure in {}", call),
            });
        }
        Ok(())
    }

    fn fill(state: &mut State, symbol: &str, side: Side, quantity: Decimal, leverage: Option<u32>) -> OrderResult {
        state.next_order_id += 1;
        OrderResult {
            symbol: symbol.to_string(),
            side,
            order_id: state.next_order_id,
            status: "FILLED".to_string(),
            executed_quantity: quantity,
            fill_price: state.price,
            leverage,
        }
    }
}

#[async_trait]
impl ExchangeGateway for FakeExchange {
    async fn get_position(&self, symbol: &str) -> Result<Option<PositionState>> {
        self.record("get_position")?;
        let position = self.state.lock().unwrap().positions.get(symbol).cloned();
        // Give concurrent reconciliations a chance to interleave
        tokio::task::yield_now().await;
        Ok(position)
    }

    async fn get_available_balance(&self, _asset: &str) -> Result<Decimal> {
        self.record("get_available_balance")?;
        Ok(self.state.lock().unwrap().balance)
    }

    async fn get_current_price(&self, _symbol: &str) -> Result<Decimal> {
        self.record("get_current_price")?;
        Ok(self.state.lock().unwrap().price)
    }

    async fn get_symbol_filters(&self, _symbol: &str) -> Result<SymbolFilters> {
        self.record("get_symbol_filters")?;
        Ok(btc_filters())
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<LeverageChange> {
        self.record("set_leverage")?;
        let mut state = self.state.lock().unwrap();
        match state.positions.get_mut(symbol) {
            Some(position) => position.leverage = leverage,
            None => {
                state.leverages.insert(symbol.to_string(), leverage);
            }
        }
        Ok(LeverageChange {
            symbol: symbol.to_string(),
            leverage,
        })
    }

    async fn close_position(&self, symbol: &str, side: Side, quantity: Decimal) -> Result<OrderResult> {
        self.record("close_position")?;
        let mut state = self.state.lock().unwrap();
        if let Some(position) = state.positions.get_mut(symbol) {
            position.signed_amount = Decimal::ZERO;
        }
        Ok(Self::fill(&mut state, symbol, side, quantity, None))
    }

    async fn open_position(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        leverage: u32,
        _order_type: OrderType,
    ) -> Result<OrderResult> {
        self.record("open_position")?;
        let mut state = self.state.lock().unwrap();
        let signed = match side {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        };
        let current_leverage = state
            .positions
            .get(symbol)
            .map(|p| p.leverage)
            .or_else(|| state.leverages.get(symbol).copied())
            .unwrap_or(leverage);
        state
            .positions
            .insert(symbol.to_string(), PositionState::new(symbol, signed, current_leverage));
        Ok(Self::fill(&mut state, symbol, side, quantity, Some(leverage)))
    }

    fn venue_name(&self) -> &'static str {
        "fake"
    }
}
