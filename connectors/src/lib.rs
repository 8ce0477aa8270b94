pub mod client;
pub mod config;
pub mod indodax;
pub mod markets;

use async_trait::async_trait;
use common::{
    models::{Balance, Candle, CandleType, Markets, OrderBook, Ticker, Timeframes, TradingMode},
    Error, Result,
};
use std::collections::HashMap;
use std::sync::Arc;

pub use client::{ClientExchange, ClientFactory, ExchangeClient};
pub use config::{Backend, Credentials, ExchangeConfig, MarketInit};
pub use indodax::IndodaxConnector;
pub use markets::MarketCache;

/// Operations a connector actually backs, as reported to the bot framework
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub fetch_ticker: bool,
    pub fetch_tickers: bool,
    pub fetch_ohlcv: bool,
    pub fetch_order_book: bool,
    pub fetch_balance: bool,
}

/// Trait defining the market-data surface the trading bot expects from an exchange
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Exchange identifier
    fn name(&self) -> &str;

    /// Supported timeframe labels and their backend resolution tokens
    fn timeframes(&self) -> &Timeframes;

    fn capabilities(&self) -> Capabilities;

    fn trading_mode(&self) -> TradingMode {
        TradingMode::Spot
    }

    /// Market metadata, fetched on first access and cached afterwards
    async fn markets(&self) -> Result<Arc<Markets>>;

    /// Get the ticker for a single symbol
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker>;

    /// Get tickers for all symbols, or only for `pairs` when given
    async fn fetch_tickers(&self, pairs: Option<&[String]>) -> Result<HashMap<String, Ticker>>;

    /// Get candles for a pair. `since` is in milliseconds.
    async fn fetch_ohlcv(
        &self,
        pair: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>>;

    async fn fetch_order_book(&self, pair: &str, _limit: Option<usize>) -> Result<OrderBook> {
        Err(Error::NotSupported(format!(
            "{} does not provide order books for {}",
            self.name(),
            pair
        )))
    }

    async fn fetch_balance(&self) -> Result<Balance>;

    /// Maximum candles one `fetch_ohlcv` call returns for `timeframe`
    fn ohlcv_candle_limit(
        &self,
        timeframe: &str,
        candle_type: CandleType,
        since_ms: Option<i64>,
    ) -> usize;

    /// Release resources. Nothing is held, so this never fails.
    fn close(&self) {}
}

/// Build the connector selected by `config.backend`.
///
/// The client backend needs a factory for the exchange client; the HTTP backend ignores it.
pub async fn build_connector(
    config: ExchangeConfig,
    factory: Option<ClientFactory>,
) -> Result<Box<dyn ExchangeConnector>> {
    match config.backend {
        Backend::Http => Ok(Box::new(IndodaxConnector::new(config).await?)),
        Backend::Client => {
            let factory = factory.ok_or_else(|| {
                Error::ConfigError("Client backend selected but no exchange client was provided".into())
            })?;
            Ok(Box::new(ClientExchange::new(config, factory).await?))
        }
    }
}
