use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market metadata keyed by unified symbol (`BTC/IDR`).
pub type Markets = HashMap<String, MarketInfo>;

/// Ticker summary for a trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Unified symbol (e.g., BTC/IDR)
    pub symbol: String,
    /// Last traded price
    pub last: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Best bid
    pub bid: Option<f64>,
    /// Best ask
    pub ask: Option<f64>,
    /// 24h volume in base currency
    pub base_volume: Option<f64>,
    /// 24h volume in quote currency
    pub quote_volume: Option<f64>,
    /// Exchange timestamp in milliseconds
    pub timestamp: Option<i64>,
}

/// One side entry of an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

/// Order book snapshot. Both sides keep the order the exchange sent them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrecision {
    /// Decimal places for prices
    pub price: Option<u32>,
    /// Decimal places for amounts
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLimits {
    /// Minimum order amount in base currency
    pub amount_min: Option<f64>,
    /// Minimum order cost in quote currency
    pub cost_min: Option<f64>,
}

/// Market metadata: fees, precision and limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Exchange-native id (e.g., btc_idr)
    pub id: String,
    /// Unified symbol (e.g., BTC/IDR)
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub active: bool,
    pub precision: MarketPrecision,
    pub limits: MarketLimits,
    pub maker_fee: Option<f64>,
    pub taker_fee: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub free: f64,
    pub used: f64,
    pub total: f64,
}

/// Account balance per currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currencies: HashMap<String, CurrencyBalance>,
}

impl Balance {
    pub fn get(&self, currency: &str) -> Option<&CurrencyBalance> {
        self.currencies.get(&currency.to_uppercase())
    }
}

/// Trading modes the bot framework distinguishes. Indodax only offers spot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Spot,
    Margin,
    Futures,
}
