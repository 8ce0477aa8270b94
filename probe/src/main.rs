mod config;

use common::models::{Candle, CandleType, OrderBook, Ticker};
use config::ProbeConfig;
use connectors::{build_connector, ExchangeConfig};
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
struct ProbeReport {
    exchange: String,
    pair: String,
    timeframe: String,
    candle_limit: usize,
    ticker: Ticker,
    candles: Vec<Candle>,
    order_book: Option<OrderBook>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let exchange_config = ExchangeConfig::from_env()
        .map_err(|e| format!("Failed to load exchange configuration: {}", e))?;
    let probe = ProbeConfig::from_env();

    info!(
        "Probing {} ({}, {} candles) via {:?} backend",
        probe.pair, probe.timeframe, probe.limit, exchange_config.backend
    );

    // No client library is linked into the probe, so only the HTTP backend can be built here.
    let connector = build_connector(exchange_config, None).await?;

    let ticker = connector.fetch_ticker(&probe.pair).await?;
    let candles = connector
        .fetch_ohlcv(&probe.pair, &probe.timeframe, None, Some(probe.limit))
        .await?;

    let order_book = if connector.capabilities().fetch_order_book {
        match connector.fetch_order_book(&probe.pair, Some(5)).await {
            Ok(book) => Some(book),
            Err(e) => {
                error!("Failed to fetch order book: {}", e);
                None
            }
        }
    } else {
        None
    };

    let report = ProbeReport {
        exchange: connector.name().to_string(),
        candle_limit: connector.ohlcv_candle_limit(&probe.timeframe, CandleType::Spot, None),
        pair: probe.pair,
        timeframe: probe.timeframe,
        ticker,
        candles,
        order_book,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    connector.close();
    Ok(())
}
