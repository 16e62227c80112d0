//! Futures Reconciler - Main Entry Point
//!
//! Serves the signal endpoints and reconciles each signal against a
//! Binance USD-M futures account.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use futures_reconciler::api;
use futures_reconciler::config::load_config;
use futures_reconciler::{BinanceFuturesClient, ReconciliationService};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Address to bind; overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Port to bind; overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Use the Binance futures testnet
    #[arg(long)]
    testnet: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(Some(&args.config)).context("loading configuration")?;
    if args.testnet {
        config.binance.testnet = true;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting futures reconciler");
    info!("Configuration file: {}", args.config);
    info!(binance = ?config.binance, trading = ?config.trading, "Loaded configuration");

    let gateway = BinanceFuturesClient::new(&config.binance).context("creating Binance client")?;
    let service = ReconciliationService::new(Arc::new(gateway), config.trading.clone());
    let app = api::router(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal, cleaning up...");
        })
        .await?;

    Ok(())
}
