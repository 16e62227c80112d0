//! Configuration types

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::types::OrderType;

/// Environment variable that overrides the configured leverage per call
pub const LEVERAGE_ENV_VAR: &str = "LEVERAGE";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Binance futures connection settings
    #[serde(default)]
    pub binance: BinanceConfig,
    /// How new positions are opened
    #[serde(default)]
    pub trading: TradingConfig,
    /// Inbound HTTP server
    #[serde(default)]
    pub server: ServerConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Binance USD-M futures configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct BinanceConfig {
    /// API key, sourced from the environment or a secret store
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret used for HMAC signing
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Base URL override for the REST API
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Use the futures testnet
    #[serde(default)]
    pub testnet: bool,
    /// Signed request validity window in milliseconds
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl BinanceConfig {
    /// REST base URL, honouring the explicit override first
    pub fn rest_base_url(&self) -> &str {
        match &self.rest_url {
            Some(url) => url,
            None if self.testnet => TESTNET_REST_URL,
            None => MAINNET_REST_URL,
        }
    }

    /// Both halves of the credential pair, if configured
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            rest_url: None,
            testnet: false,
            recv_window_ms: default_recv_window(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("rest_url", &self.rest_base_url())
            .field("testnet", &self.testnet)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

pub const MAINNET_REST_URL: &str = "https://fapi.binance.com";
pub const TESTNET_REST_URL: &str = "https://testnet.binancefuture.com";

fn default_recv_window() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

/// Trading parameters applied to every reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Leverage used when the `LEVERAGE` variable is unset
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    /// Order type for opening positions
    #[serde(default)]
    pub order_type: OrderType,
    /// Margin asset whose balance sizes new positions
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
}

impl TradingConfig {
    /// Leverage for the current reconciliation.
    ///
    /// Re-reads `LEVERAGE` on every call so operators can change it between
    /// signals without a restart.
    pub fn configured_leverage(&self) -> u32 {
        match std::env::var(LEVERAGE_ENV_VAR) {
            Ok(raw) => parse_leverage(&raw).unwrap_or_else(|| {
                warn!(value = %raw, fallback = self.leverage, "Ignoring invalid LEVERAGE value");
                self.leverage
            }),
            Err(_) => self.leverage,
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            leverage: default_leverage(),
            order_type: OrderType::default(),
            quote_asset: default_quote_asset(),
        }
    }
}

/// Parse a positive integer leverage
pub fn parse_leverage(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|l| *l > 0)
}

fn default_leverage() -> u32 {
    1
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

/// Inbound HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// API credentials for signed requests
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_selection() {
        let mut config = BinanceConfig::default();
        assert_eq!(config.rest_base_url(), MAINNET_REST_URL);

        config.testnet = true;
        assert_eq!(config.rest_base_url(), TESTNET_REST_URL);

        config.rest_url = Some("http://127.0.0.1:9000".to_string());
        assert_eq!(config.rest_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let mut config = BinanceConfig {
            api_key: Some("key".into()),
            ..Default::default()
        };
        assert!(config.credentials().is_none());

        config.api_secret = Some(String::new());
        assert!(config.credentials().is_none());

        config.api_secret = Some("secret".into());
        assert!(config.credentials().is_some());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = BinanceConfig {
            api_key: Some("visible-key".into()),
            api_secret: Some("visible-secret".into()),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("visible-key"));
        assert!(!rendered.contains("visible-secret"));

        let creds = config.credentials().unwrap();
        assert!(!format!("{:?}", creds).contains("visible-secret"));
    }

    #[test]
    fn test_parse_leverage() {
        assert_eq!(parse_leverage("10"), Some(10));
        assert_eq!(parse_leverage(" 3 "), Some(3));
        assert_eq!(parse_leverage("0"), None);
        assert_eq!(parse_leverage("-2"), None);
        assert_eq!(parse_leverage("ten"), None);
    }

    #[test]
    fn test_trading_defaults() {
        let trading = TradingConfig::default();
        assert_eq!(trading.leverage, 1);
        assert_eq!(trading.order_type, OrderType::Market);
        assert_eq!(trading.quote_asset, "USDT");
    }
}
