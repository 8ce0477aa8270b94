use crate::{Capabilities, ExchangeConfig, ExchangeConnector, MarketCache, MarketInit};
use async_trait::async_trait;
use common::{
    models::{
        Balance, Candle, CandleLimits, CandleType, MarketInfo, MarketLimits, MarketPrecision,
        Markets, OrderBook, PriceLevel, Ticker, Timeframes, TradingPair,
    },
    Error, Result,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Span};

pub struct IndodaxConnector {
    client: reqwest::Client,
    base_url: String,
    timeframes: Timeframes,
    candle_limits: CandleLimits,
    markets: MarketCache,
    span: Span,
}

/// Indodax sends most numbers as strings, some as JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Num(f64);

impl<'de> Deserialize<'de> for Num {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Num(n)),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Num)
                .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", s, e))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerAll {
    /// Rows are parsed one at a time so a malformed pair cannot spoil the rest
    tickers: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    last: Num,
    #[serde(default)]
    high: Option<Num>,
    #[serde(default)]
    low: Option<Num>,
    #[serde(default)]
    buy: Option<Num>,
    #[serde(default)]
    sell: Option<Num>,
    /// Seconds
    #[serde(default)]
    server_time: Option<Num>,
    /// `vol_<base>` and `vol_<quote>` keys, named after the pair's currencies
    #[serde(flatten)]
    volumes: HashMap<String, serde_json::Value>,
}

// Chart rows: {"Time": 1700000000, "Open": ..., "High": ..., "Low": ..., "Close": ..., "Volume": "..."}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCandle {
    time: Num,
    open: Num,
    high: Num,
    low: Num,
    close: Num,
    volume: Num,
}

#[derive(Debug, Deserialize)]
struct RawDepth {
    #[serde(default)]
    buy: Vec<(Num, Num)>,
    #[serde(default)]
    sell: Vec<(Num, Num)>,
}

#[derive(Debug, Deserialize)]
struct RawPair {
    ticker_id: String,
    #[serde(default)]
    price_round: Option<Num>,
    #[serde(default)]
    volume_precision: Option<Num>,
    #[serde(default)]
    trade_min_base_currency: Option<Num>,
    #[serde(default)]
    trade_min_traded_currency: Option<Num>,
    #[serde(default)]
    trade_fee_percent: Option<Num>,
    #[serde(default)]
    trade_fee_percent_maker: Option<Num>,
    #[serde(default)]
    trade_fee_percent_taker: Option<Num>,
    #[serde(default)]
    is_maintenance: Option<Num>,
}

fn json_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_ticker(market_id: &str, row: serde_json::Value) -> Result<Ticker> {
    let pair = TradingPair::from_market_id(market_id)?;
    let raw: RawTicker = serde_json::from_value(row).map_err(|e| {
        Error::ParseError(format!("Failed to parse Indodax ticker {}: {}", market_id, e))
    })?;
    let volume = |currency: &str| {
        raw.volumes
            .get(&format!("vol_{}", currency.to_lowercase()))
            .and_then(json_f64)
    };

    Ok(Ticker {
        symbol: pair.symbol(),
        last: raw.last.0,
        high: raw.high.map(|n| n.0),
        low: raw.low.map(|n| n.0),
        bid: raw.buy.map(|n| n.0),
        ask: raw.sell.map(|n| n.0),
        base_volume: volume(&pair.base),
        quote_volume: volume(&pair.quote),
        timestamp: raw.server_time.map(|n| n.0 as i64 * 1000),
    })
}

/// Decimal places must be a non-negative whole number; anything else is dropped.
fn decimals(n: Num) -> Option<u32> {
    let value = n.0;
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

fn to_market(raw: RawPair) -> Result<MarketInfo> {
    let pair = TradingPair::from_market_id(&raw.ticker_id)?;
    let percent = |n: Option<Num>| n.map(|n| n.0 / 100.0);

    Ok(MarketInfo {
        id: raw.ticker_id.clone(),
        symbol: pair.symbol(),
        base: pair.base,
        quote: pair.quote,
        active: raw.is_maintenance.map_or(true, |n| n.0 == 0.0),
        precision: MarketPrecision {
            price: raw.price_round.and_then(decimals),
            amount: raw.volume_precision.and_then(decimals),
        },
        limits: MarketLimits {
            amount_min: raw.trade_min_traded_currency.map(|n| n.0),
            cost_min: raw.trade_min_base_currency.map(|n| n.0),
        },
        maker_fee: percent(raw.trade_fee_percent_maker.or(raw.trade_fee_percent)),
        taker_fee: percent(raw.trade_fee_percent_taker.or(raw.trade_fee_percent)),
    })
}

fn to_levels(side: Vec<(Num, Num)>, limit: Option<usize>) -> Vec<PriceLevel> {
    side.into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(price, size)| PriceLevel {
            price: price.0,
            size: size.0,
        })
        .collect()
}

impl IndodaxConnector {
    pub async fn new(config: ExchangeConfig) -> Result<Self> {
        let span = info_span!("exchange", name = "indodax", backend = "http");
        Self::with_span(config, span).await
    }

    /// Like [`IndodaxConnector::new`], logging under the given span.
    pub async fn with_span(config: ExchangeConfig, span: Span) -> Result<Self> {
        let timeframes = Timeframes::indodax_chart();
        if config.validate {
            config.candle_limits.validate_against(&timeframes)?;
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::HttpError)?;

        if !config.credentials.is_empty() {
            info!(
                parent: &span,
                "API credentials supplied; only public endpoints are available over direct HTTP"
            );
        }

        let connector = Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeframes,
            candle_limits: config.candle_limits,
            markets: MarketCache::new(),
            span,
        };

        if config.market_init == MarketInit::Eager {
            connector.markets().await?;
        }

        Ok(connector)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        debug!(parent: &self.span, "Fetching from Indodax: {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(Error::HttpError)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(parent: &self.span, "Indodax API error: {} - {}", status, error_text);
            return Err(Error::ExchangeError(format!(
                "Indodax API error: {} - {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            Error::ParseError(format!("Failed to parse Indodax response: {}", e))
        })?;

        // Errors can also arrive with a 200 status: {"error": "...", "error_description": "..."}
        if let Some(err) = body.get("error").and_then(|e| e.as_str()) {
            let description = body
                .get("error_description")
                .and_then(|d| d.as_str())
                .unwrap_or_default();
            error!(parent: &self.span, "Indodax API error: {} - {}", err, description);
            return Err(Error::ExchangeError(format!(
                "Indodax API error: {} - {}",
                err, description
            )));
        }

        serde_json::from_value(body).map_err(|e| {
            Error::ParseError(format!("Failed to parse Indodax {} response: {}", path, e))
        })
    }

    async fn ticker_all(&self) -> Result<HashMap<String, serde_json::Value>> {
        let raw: TickerAll = self.get("ticker_all", &[]).await?;
        Ok(raw.tickers)
    }

    async fn ticker(&self, symbol: &str) -> Result<Ticker> {
        let pair: TradingPair = symbol.parse()?;
        let market_id = pair.market_id();
        let mut rows = self.ticker_all().await?;

        let row = rows
            .remove(&market_id)
            .ok_or_else(|| Error::NotFound(format!("No ticker returned for {}", pair)))?;
        to_ticker(&market_id, row)
    }

    async fn tickers(&self, pairs: Option<&[String]>) -> Result<HashMap<String, Ticker>> {
        let wanted = pairs
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|p| p.parse::<TradingPair>().map(|pair| pair.market_id()))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let rows = self.ticker_all().await?;

        let mut tickers = HashMap::with_capacity(rows.len());
        for (id, row) in rows {
            if let Some(wanted) = &wanted {
                if !wanted.contains(&id) {
                    continue;
                }
            }
            match to_ticker(&id, row) {
                Ok(ticker) => {
                    tickers.insert(ticker.symbol.clone(), ticker);
                }
                Err(e) => warn!(parent: &self.span, "Skipping ticker {}: {}", id, e),
            }
        }

        Ok(tickers)
    }

    async fn candles(
        &self,
        pair: &str,
        resolution: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>> {
        let pair: TradingPair = pair.parse()?;

        let mut params = vec![("pair", pair.market_id()), ("tf", resolution.to_string())];
        if let Some(since) = since {
            // Chart endpoint takes seconds
            params.push(("from", (since / 1000).to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let rows: Option<Vec<RawCandle>> = self.get("chart", &params).await?;

        Ok(rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| Candle {
                open_time_ms: row.time.0 as i64 * 1000,
                open: row.open.0,
                high: row.high.0,
                low: row.low.0,
                close: row.close.0,
                volume: row.volume.0,
            })
            .collect())
    }

    async fn order_book(&self, pair: &str, limit: Option<usize>) -> Result<OrderBook> {
        let pair: TradingPair = pair.parse()?;
        let raw: RawDepth = self
            .get(&format!("depth/{}", pair.market_id()), &[])
            .await?;

        Ok(OrderBook {
            bids: to_levels(raw.buy, limit),
            asks: to_levels(raw.sell, limit),
        })
    }

    async fn load_markets(&self) -> Result<Markets> {
        let raw: Vec<RawPair> = self.get("pairs", &[]).await?;

        let mut markets = Markets::with_capacity(raw.len());
        for entry in raw {
            let id = entry.ticker_id.clone();
            match to_market(entry) {
                Ok(market) => {
                    markets.insert(market.symbol.clone(), market);
                }
                Err(e) => warn!(parent: &self.span, "Skipping market {}: {}", id, e),
            }
        }

        info!(parent: &self.span, "Markets initialized: {} pairs", markets.len());
        Ok(markets)
    }

    fn wrap(&self, context: String, err: Error) -> Error {
        error!(parent: &self.span, "Request for {} failed: {}", context, err);
        Error::request(context, err)
    }
}

#[async_trait]
impl ExchangeConnector for IndodaxConnector {
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
            fetch_order_book: true,
            fetch_balance: false,
        }
    }

    async fn markets(&self) -> Result<Arc<Markets>> {
        self.markets
            .get_or_load(|| async {
                debug!(parent: &self.span, "Markets not initialized. Fetching from API");
                self.load_markets().await
            })
            .await
            .map_err(|e| {
                error!(parent: &self.span, "{}", e);
                e
            })
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        self.ticker(symbol)
            .await
            .map_err(|e| self.wrap(symbol.to_string(), e))
    }

    async fn fetch_tickers(&self, pairs: Option<&[String]>) -> Result<HashMap<String, Ticker>> {
        self.tickers(pairs).await.map_err(|e| {
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

        self.candles(pair, resolution, since, limit)
            .await
            .map_err(|e| self.wrap(pair.to_string(), e))
    }

    async fn fetch_order_book(&self, pair: &str, limit: Option<usize>) -> Result<OrderBook> {
        self.order_book(pair, limit)
            .await
            .map_err(|e| self.wrap(pair.to_string(), e))
    }

    async fn fetch_balance(&self) -> Result<Balance> {
        Err(Error::NotSupported(
            "fetch_balance: authenticated requests require request signing, which is not implemented"
                .to_string(),
        ))
    }

    fn ohlcv_candle_limit(
        &self,
        timeframe: &str,
        _candle_type: CandleType,
        _since_ms: Option<i64>,
    ) -> usize {
        self.candle_limits.get(timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::error::Error as _;

    const TICKER_ALL: &str = r#"{
        "tickers": {
            "btc_idr": {
                "high": "1070000000", "low": "1020000000",
                "vol_btc": "12.5", "vol_idr": "13000000000",
                "last": "1050000000", "buy": "1049000000", "sell": "1050000000",
                "server_time": 1700000000
            },
            "eth_idr": {
                "high": "40000000", "low": "38000000",
                "vol_eth": "300.1", "vol_idr": "11700000000",
                "last": "39000000", "buy": "38990000", "sell": "39000000",
                "server_time": 1700000000
            }
        }
    }"#;

    async fn connector_for(server: &mockito::ServerGuard) -> IndodaxConnector {
        let config = ExchangeConfig {
            base_url: server.url(),
            ..ExchangeConfig::default()
        };
        IndodaxConnector::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn ticker_from_ticker_all() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ticker_all")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TICKER_ALL)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let ticker = connector.fetch_ticker("BTC/IDR").await.unwrap();

        assert_eq!(ticker.symbol, "BTC/IDR");
        assert_eq!(ticker.last, 1_050_000_000.0);
        assert_eq!(ticker.bid, Some(1_049_000_000.0));
        assert_eq!(ticker.base_volume, Some(12.5));
        assert_eq!(ticker.quote_volume, Some(13_000_000_000.0));
        assert_eq!(ticker.timestamp, Some(1_700_000_000_000));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn tickers_filtered_by_pairs() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker_all")
            .with_status(200)
            .with_body(TICKER_ALL)
            .expect(2)
            .create_async()
            .await;

        let connector = connector_for(&server).await;

        let all = connector.fetch_tickers(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let pairs = vec!["ETH/IDR".to_string()];
        let some = connector.fetch_tickers(Some(&pairs)).await.unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some["ETH/IDR"].base_volume, Some(300.1));
    }

    #[tokio::test]
    async fn missing_ticker_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker_all")
            .with_status(200)
            .with_body(TICKER_ALL)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let err = connector.fetch_ticker("DOGE/IDR").await.unwrap_err();

        assert!(matches!(err, Error::ExchangeRequest { .. }));
        assert!(err.to_string().contains("DOGE/IDR"));
    }

    const TICKER_ALL_WITH_BAD_ROWS: &str = r#"{
        "tickers": {
            "btc_idr": {
                "high": "1070000000", "low": "1020000000",
                "vol_btc": "12.5", "vol_idr": "13000000000",
                "last": "1050000000", "buy": "1049000000", "sell": "1050000000",
                "server_time": 1700000000
            },
            "usdtidr": {"last": "15800"},
            "eth_idr": {"high": "40000000", "low": "38000000"}
        }
    }"#;

    #[tokio::test]
    async fn malformed_rows_do_not_spoil_other_tickers() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker_all")
            .with_status(200)
            .with_body(TICKER_ALL_WITH_BAD_ROWS)
            .expect(4)
            .create_async()
            .await;

        let connector = connector_for(&server).await;

        let btc = connector.fetch_ticker("BTC/IDR").await.unwrap();
        assert_eq!(btc.last, 1_050_000_000.0);

        let all = connector.fetch_tickers(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("BTC/IDR"));

        let pairs = vec!["BTC/IDR".to_string(), "ETH/IDR".to_string()];
        let some = connector.fetch_tickers(Some(&pairs)).await.unwrap();
        assert_eq!(some.keys().collect::<Vec<_>>(), vec!["BTC/IDR"]);

        // The requested pair's own row is still an error
        let err = connector.fetch_ticker("ETH/IDR").await.unwrap_err();
        assert!(matches!(err, Error::ExchangeRequest { .. }));
        assert!(err.to_string().contains("ETH/IDR"));
        assert!(err.source().unwrap().to_string().contains("last"));
    }

    #[tokio::test]
    async fn http_failure_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker_all")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let err = connector.fetch_ticker("BTC/IDR").await.unwrap_err();

        assert!(err.to_string().contains("BTC/IDR"));
        let cause = err.source().unwrap().to_string();
        assert!(cause.contains("500"));
        assert!(cause.contains("upstream down"));
    }

    #[tokio::test]
    async fn error_body_with_ok_status_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/depth/xyz_idr")
            .with_status(200)
            .with_body(r#"{"error": "invalid_pair", "error_description": "Invalid pair"}"#)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let err = connector.fetch_order_book("XYZ/IDR", None).await.unwrap_err();

        assert!(matches!(err, Error::ExchangeRequest { .. }));
        assert!(err.source().unwrap().to_string().contains("invalid_pair"));
    }

    #[tokio::test]
    async fn ohlcv_maps_chart_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chart")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pair".into(), "btc_idr".into()),
                Matcher::UrlEncoded("tf".into(), "60".into()),
                Matcher::UrlEncoded("from".into(), "1699990000".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"Time": 1700000000, "Open": 100, "High": "110", "Low": 90.0, "Close": 105, "Volume": "42.5"}]"#,
            )
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let candles = connector
            .fetch_ohlcv("BTC/IDR", "1h", Some(1_699_990_000_000), Some(1))
            .await
            .unwrap();

        assert_eq!(candles.len(), 1);
        assert_eq!(
            candles[0].to_tuple(),
            (1_700_000_000_000i64, 100.0, 110.0, 90.0, 105.0, 42.5)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ohlcv_without_candles_is_empty() {
        for body in ["[]", "null"] {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("GET", "/chart")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(body)
                .create_async()
                .await;

            let connector = connector_for(&server).await;
            let candles = connector
                .fetch_ohlcv("BTC/IDR", "1d", None, None)
                .await
                .unwrap();
            assert!(candles.is_empty(), "body {}", body);
        }
    }

    #[tokio::test]
    async fn unsupported_timeframe_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let err = connector
            .fetch_ohlcv("BTC/IDR", "5m", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedTimeframe(tf) if tf == "5m"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn order_book_keeps_exchange_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/depth/btc_idr")
            .with_status(200)
            .with_body(
                r#"{
                    "buy": [[1049000000, "0.5"], [1050000000, "0.1"], [1048000000, "2"]],
                    "sell": [["1051000000", "0.3"], [1050500000, 1.25]]
                }"#,
            )
            .expect(2)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let book = connector.fetch_order_book("BTC/IDR", None).await.unwrap();

        let bid_prices: Vec<f64> = book.bids.iter().map(|l| l.price).collect();
        assert_eq!(bid_prices, vec![1_049_000_000.0, 1_050_000_000.0, 1_048_000_000.0]);
        assert_eq!(
            book.asks,
            vec![
                PriceLevel { price: 1_051_000_000.0, size: 0.3 },
                PriceLevel { price: 1_050_500_000.0, size: 1.25 },
            ]
        );

        let top = connector.fetch_order_book("BTC/IDR", Some(1)).await.unwrap();
        assert_eq!(top.bids.len(), 1);
        assert_eq!(top.asks.len(), 1);
        assert_eq!(top.bids[0].size, 0.5);
    }

    #[tokio::test]
    async fn balance_requires_signing() {
        let server = mockito::Server::new_async().await;
        let connector = connector_for(&server).await;

        match connector.fetch_balance().await {
            Err(Error::NotSupported(msg)) => assert!(msg.contains("signing")),
            other => panic!("expected NotSupported, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn markets_loaded_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pairs")
            .with_status(200)
            .with_body(
                r#"[
                    {"ticker_id": "btc_idr", "price_round": 0, "volume_precision": 8,
                     "trade_min_base_currency": 10000, "trade_min_traded_currency": "0.0001",
                     "trade_fee_percent": 0.3, "trade_fee_percent_maker": 0, "is_maintenance": 0},
                    {"ticker_id": "usdtidr"}
                ]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let connector = connector_for(&server).await;
        let first = connector.markets().await.unwrap();
        let second = connector.markets().await.unwrap();

        assert_eq!(*first, *second);
        assert_eq!(first.len(), 1);

        let btc = &first["BTC/IDR"];
        assert_eq!(btc.id, "btc_idr");
        assert!(btc.active);
        assert_eq!(btc.precision.amount, Some(8));
        assert_eq!(btc.limits.amount_min, Some(0.0001));
        assert_eq!(btc.maker_fee, Some(0.0));
        assert_eq!(btc.taker_fee, Some(0.003));
        mock.assert_async().await;
    }

    #[test]
    fn precision_must_be_whole_and_non_negative() {
        let raw: RawPair = serde_json::from_str(
            r#"{"ticker_id": "btc_idr", "price_round": 2.5, "volume_precision": -1}"#,
        )
        .unwrap();
        let market = to_market(raw).unwrap();
        assert_eq!(market.precision.price, None);
        assert_eq!(market.precision.amount, None);

        let raw: RawPair = serde_json::from_str(
            r#"{"ticker_id": "btc_idr", "price_round": "0", "volume_precision": 8}"#,
        )
        .unwrap();
        let market = to_market(raw).unwrap();
        assert_eq!(market.precision.price, Some(0));
        assert_eq!(market.precision.amount, Some(8));
    }

    #[tokio::test]
    async fn eager_market_failure_fails_construction() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pairs")
            .with_status(503)
            .create_async()
            .await;

        let config = ExchangeConfig {
            base_url: server.url(),
            market_init: MarketInit::Eager,
            ..ExchangeConfig::default()
        };

        let result = IndodaxConnector::new(config).await;
        assert!(matches!(result, Err(Error::MarketInitialization(_))));
    }

    #[tokio::test]
    async fn candle_limits_and_close() {
        let server = mockito::Server::new_async().await;
        let connector = connector_for(&server).await;

        assert_eq!(connector.ohlcv_candle_limit("30m", CandleType::Spot, None), 48);
        assert_eq!(connector.ohlcv_candle_limit("5m", CandleType::Spot, None), 100);
        assert_eq!(connector.timeframes().resolve("1d").unwrap(), "1D");

        connector.close();
        connector.close();
    }
}
