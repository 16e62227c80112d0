//! Binance module - Gateway implementation for the USD-M futures API

pub mod auth;
pub mod client;
pub mod messages;
pub mod rest;

pub use client::BinanceFuturesClient;
pub use rest::BinanceRestClient;
