//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{GatewayError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. `BINANCE_API_KEY` / `BINANCE_API_SECRET`
/// 2. Environment variables (prefixed with APP__, `__` separated)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| GatewayError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| GatewayError::Configuration(e.to_string()))?;

    apply_credential_env(&mut app_config);
    Ok(app_config)
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    load_config(None)
}

fn apply_credential_env(config: &mut AppConfig) {
    if let Ok(key) = std::env::var("BINANCE_API_KEY") {
        config.binance.api_key = Some(key);
    }
    if let Ok(secret) = std::env::var("BINANCE_API_SECRET") {
        config.binance.api_secret = Some(secret);
    }
}
