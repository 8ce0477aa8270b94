use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One OHLCV bucket. Field order matches the `(open_time_ms, open, high, low, close, volume)`
/// tuple the bot framework consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, milliseconds since the epoch
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn to_tuple(&self) -> (i64, f64, f64, f64, f64, f64) {
        (
            self.open_time_ms,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }

    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.open_time_ms).single()
    }
}

impl From<(i64, f64, f64, f64, f64, f64)> for Candle {
    fn from((open_time_ms, open, high, low, close, volume): (i64, f64, f64, f64, f64, f64)) -> Self {
        Self {
            open_time_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Kind of candle series requested by the bot framework
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandleType {
    #[default]
    #[serde(rename = "spot")]
    Spot,
    #[serde(rename = "futures")]
    Futures,
    #[serde(rename = "mark")]
    Mark,
    #[serde(rename = "index")]
    Index,
    #[serde(rename = "funding_rate")]
    FundingRate,
}

impl fmt::Display for CandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandleType::Spot => write!(f, "spot"),
            CandleType::Futures => write!(f, "futures"),
            CandleType::Mark => write!(f, "mark"),
            CandleType::Index => write!(f, "index"),
            CandleType::FundingRate => write!(f, "funding_rate"),
        }
    }
}
