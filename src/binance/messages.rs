//! Binance USD-M futures wire types

use serde::{Deserialize, Serialize};

/// Error body returned on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Entry of `GET /fapi/v2/positionRisk`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRiskResponse {
    pub symbol: String,
    pub position_amt: String,
    pub leverage: String,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub mark_price: Option<String>,
    /// BOTH in one-way mode, LONG/SHORT in hedge mode
    #[serde(default = "default_position_side")]
    pub position_side: String,
}

fn default_position_side() -> String {
    "BOTH".to_string()
}

/// Entry of `GET /fapi/v2/balance`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub asset: String,
    pub balance: String,
    pub available_balance: String,
}

/// `GET /fapi/v1/ticker/price`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

/// `GET /fapi/v1/exchangeInfo`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

/// Filters relevant to sizing; anything else is ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: String,
        max_qty: String,
        step_size: String,
    },
    #[serde(rename = "MARKET_LOT_SIZE", rename_all = "camelCase")]
    MarketLotSize {
        min_qty: String,
        max_qty: String,
        step_size: String,
    },
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter {
        min_price: String,
        max_price: String,
        tick_size: String,
    },
    #[serde(other)]
    Other,
}

/// `POST /fapi/v1/leverage`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageResponse {
    pub symbol: String,
    pub leverage: u32,
    #[serde(default)]
    pub max_notional_value: Option<String>,
}

/// `POST /fapi/v1/order`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub symbol: String,
    pub status: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(default)]
    pub orig_qty: Option<String>,
    pub executed_qty: String,
    #[serde(default)]
    pub avg_price: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub reduce_only: bool,
}
