//! REST API client for Binance USD-M futures

use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::auth::{signed_payload, API_KEY_HEADER};
use super::messages::*;
use crate::common::errors::{GatewayError, Result};
use crate::common::types::{OrderType, Side};
use crate::config::types::ApiCredentials;

/// REST API client for Binance USD-M futures
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the futures API
    base_url: String,
    /// Credentials for signed endpoints
    credentials: ApiCredentials,
    /// Signed request validity window
    recv_window_ms: u64,
}

/// Parameters of a new order
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub symbol: &'a str,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Required for limit orders
    pub price: Option<Decimal>,
    pub reduce_only: bool,
}

impl BinanceRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str, credentials: ApiCredentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(
        base_url: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            recv_window_ms: 5000,
        })
    }

    /// Override the signed request validity window
    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    /// Latest price for a symbol
    #[instrument(skip(self))]
    pub async fn get_ticker_price(&self, symbol: &str) -> Result<Decimal> {
        let ticker: TickerPriceResponse = self
            .public_get("/fapi/v1/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        parse_decimal("price", &ticker.price)
    }

    /// Exchange rules for a single symbol
    #[instrument(skip(self))]
    pub async fn get_symbol_info(&self, symbol: &str) -> Result<SymbolInfo> {
        let info: ExchangeInfoResponse = self
            .public_get("/fapi/v1/exchangeInfo", &[("symbol", symbol.to_string())])
            .await?;
        info.symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| GatewayError::NotFound(format!("symbol {}", symbol)))
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Position risk entries for a symbol
    #[instrument(skip(self))]
    pub async fn get_position_risk(&self, symbol: &str) -> Result<Vec<PositionRiskResponse>> {
        self.signed_get("/fapi/v2/positionRisk", &[("symbol", symbol.to_string())])
            .await
    }

    /// Futures wallet balances for every asset
    #[instrument(skip(self))]
    pub async fn get_balances(&self) -> Result<Vec<BalanceResponse>> {
        self.signed_get("/fapi/v2/balance", &[]).await
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Change initial leverage for a symbol
    #[instrument(skip(self))]
    pub async fn change_leverage(&self, symbol: &str, leverage: u32) -> Result<LeverageResponse> {
        self.signed_post(
            "/fapi/v1/leverage",
            &[
                ("symbol", symbol.to_string()),
                ("leverage", leverage.to_string()),
            ],
        )
        .await
    }

    /// Submit a new order
    #[instrument(skip(self), fields(symbol = order.symbol, side = %order.side))]
    pub async fn new_order(&self, order: &NewOrder<'_>) -> Result<OrderResponse> {
        let mut params = vec![
            ("symbol", order.symbol.to_string()),
            ("side", order.side.as_str().to_string()),
            ("type", order.order_type.as_str().to_string()),
            ("quantity", order.quantity.normalize().to_string()),
            ("newOrderRespType", "RESULT".to_string()),
        ];
        if order.reduce_only {
            params.push(("reduceOnly", "true".to_string()));
        }
        if order.order_type == OrderType::Limit {
            let price = order.price.ok_or_else(|| {
                GatewayError::Internal("limit order submitted without a price".to_string())
            })?;
            params.push(("price", price.normalize().to_string()));
            params.push(("timeInForce", "GTC".to_string()));
        }

        self.signed_post("/fapi/v1/order", &params).await
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let response = self.client.get(&url).query(params).send().await?;
        Self::handle_response(response).await
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let payload = self.sign(params)?;
        let url = format!("{}{}?{}", self.base_url, endpoint, payload);
        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn signed_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let payload = self.sign(params)?;
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST (signed) {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn sign(&self, params: &[(&str, String)]) -> Result<String> {
        signed_payload(
            &self.credentials.api_secret,
            params,
            chrono::Utc::now().timestamp_millis(),
            self.recv_window_ms,
        )
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            let retry_after_seconds = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let message = response.text().await.unwrap_or_default();
            warn!(%status, ?retry_after_seconds, "Rate limited by Binance");
            return Err(GatewayError::RateLimit {
                message,
                retry_after_seconds,
            });
        }

        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                warn!("Failed to parse response: {} - Body: {}", e, body);
                GatewayError::InvalidResponse(format!("{}: {}", e, body))
            });
        }

        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => Err(map_error_code(error.code, &error.msg)),
            Err(_) => Err(GatewayError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            ))),
        }
    }
}

/// Map a Binance error code onto the gateway error taxonomy
pub fn map_error_code(code: i64, msg: &str) -> GatewayError {
    match code {
        -1002 | -1022 | -2014 | -2015 => GatewayError::Authentication(msg.to_string()),
        -1003 | -1015 => GatewayError::RateLimit {
            message: msg.to_string(),
            retry_after_seconds: None,
        },
        -1121 => GatewayError::NotFound(msg.to_string()),
        _ => GatewayError::Api {
            code,
            message: msg.to_string(),
        },
    }
}

/// Parse a decimal string field from an API response
pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| GatewayError::InvalidResponse(format!("Invalid {} '{}': {}", field, value, e)))
}
