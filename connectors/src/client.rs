use crate::{Capabilities, Credentials, ExchangeConfig, ExchangeConnector, MarketCache, MarketInit};
use async_trait::async_trait;
use common::{
    models::{Balance, Candle, CandleLimits, CandleType, Markets, Ticker, Timeframes},
    Error, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Span};

/// Calls a full exchange client library exposes
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker>;

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> Result<HashMap<String, Ticker>>;

    /// `resolution` is the backend token, already mapped from the canonical label
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        resolution: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>>;

    async fn load_markets(&self) -> Result<Markets>;

    async fn fetch_balance(&self) -> Result<Balance>;
}

/// Builds the exchange client from the configured credentials
pub type ClientFactory =
    Box<dyn FnOnce(&Credentials) -> Result<Arc<dyn ExchangeClient>> + Send>;

pub struct ClientExchange {
    client: Arc<dyn ExchangeClient>,
    timeframes: Timeframes,
    candle_limits: CandleLimits,
    markets: MarketCache,
    span: Span,
}

impl ClientExchange {
    pub async fn new(config: ExchangeConfig, factory: ClientFactory) -> Result<Self> {
        let span = info_span!("exchange", name = "indodax", backend = "client");
        Self::with_span(config, factory, span).await
    }

    /// Like [`ClientExchange::new`], logging under the given span.
    pub async fn with_span(
        config: ExchangeConfig,
        factory: ClientFactory,
        span: Span,
    ) -> Result<Self> {
        let timeframes = Timeframes::canonical();
        if config.validate {
            config.candle_limits.validate_against(&timeframes)?;
        }

        let client = factory(&config.credentials)?;

        let exchange = Self {
            client,
            timeframes,
            candle_limits: config.candle_limits,
            markets: MarketCache::new(),
            span,
        };

        if config.market_init == MarketInit::Eager {
            exchange.markets().await?;
        }

        Ok(exchange)
    }

    fn wrap(&self, context: String, err: Error) -> Error {
        error!(parent: &self.span, "Request for {} failed: {}", context, err);
        Error::request(context, err)
    }
}

#[async_trait]
impl ExchangeConnector for ClientExchange {
    fn name(&self) -> &str {
        "indodax"
    }

    fn timeframes(&self) -> &Timeframes {
        &self.timeframes
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            fetch_ticker: true,
            fetch_tickers: true,
            fetch_ohlcv: true,
            fetch_order_book: false,
            fetch_balance: true,
        }
    }

    async fn markets(&self) -> Result<Arc<Markets>> {
        let result = self
            .markets
            .get_or_load(|| async {
                debug!(parent: &self.span, "Markets not initialized. Fetching from client");
                self.client.load_markets().await
            })
            .await;

        match &result {
            Ok(markets) => debug!(parent: &self.span, "Serving {} markets", markets.len()),
            Err(e) => error!(parent: &self.span, "{}", e),
        }
        result
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        debug!(parent: &self.span, "Fetching ticker for {}", symbol);
        self.client
            .fetch_ticker(symbol)
            .await
            .map_err(|e| self.wrap(symbol.to_string(), e))
    }

    async fn fetch_tickers(&self, pairs: Option<&[String]>) -> Result<HashMap<String, Ticker>> {
        debug!(parent: &self.span, "Fetching tickers for {:?}", pairs);
        self.client.fetch_tickers(pairs).await.map_err(|e| {
            let context = pairs
                .map(|p| p.join(", "))
                .unwrap_or_else(|| "all pairs".to_string());
            self.wrap(context, e)
        })
    }

    async fn fetch_ohlcv(
        &self,
        pair: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>> {
        let resolution = self.timeframes.resolve(timeframe)?;

        debug!(
            parent: &self.span,
            "Fetching OHLCV for {} (resolution: {}, since: {:?}, limit: {:?})",
            pair, resolution, since, limit
        );

        self.client
            .fetch_ohlcv(pair, resolution, since, limit)
            .await
            .map_err(|e| self.wrap(pair.to_string(), e))
    }

    async fn fetch_balance(&self) -> Result<Balance> {
        debug!(parent: &self.span, "Fetching balance");
        self.client
            .fetch_balance()
            .await
            .map_err(|e| self.wrap("balance".to_string(), e))
    }

    fn ohlcv_candle_limit(
        &self,
        timeframe: &str,
        _candle_type: CandleType,
        _since_ms: Option<i64>,
    ) -> usize {
        self.candle_limits.get(timeframe)
    }

    fn close(&self) {
        info!(parent: &self.span, "Closing exchange connector");
    }
}
