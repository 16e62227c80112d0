//! Thin HTTP surface: accepts signals and returns execution reports

pub mod models;
pub mod routes;

pub use models::{ErrorResponse, SignalPayload, TradeResponse};
pub use routes::router;
