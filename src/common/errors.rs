//! Error types for the application

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for exchange gateway calls
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failure reported by the exchange gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP transport errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors (bad key, bad signature, missing permission)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}, retry after {retry_after_seconds:?} seconds")]
    RateLimit {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    /// The exchange rejected the request
    #[error("Exchange rejected request ({code}): {message}")]
    Api { code: i64, message: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Symbol or asset not known to the exchange
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised while reconciling a signal
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Any failure from the exchange gateway
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Sizing could not produce a tradable quantity
    #[error("Insufficient balance to open {symbol}: sized quantity {quantity} is below minimum {min_qty}")]
    InsufficientBalance {
        symbol: String,
        quantity: Decimal,
        min_qty: Decimal,
    },

    /// The inbound signal is malformed
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),
}

impl ReconcileError {
    /// Stable, machine-readable kind name
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::Gateway(_) => "gateway",
            ReconcileError::InsufficientBalance { .. } => "insufficient_balance",
            ReconcileError::InvalidSignal(_) => "invalid_signal",
        }
    }
}
