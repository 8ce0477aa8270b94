use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Candle count reported for timeframes missing from a [`CandleLimits`] table.
pub const DEFAULT_CANDLE_LIMIT: usize = 100;

/// Canonical timeframe label -> backend resolution token.
///
/// Built once per connector and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframes {
    tokens: BTreeMap<String, String>,
}

impl Timeframes {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            tokens: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Labels passed through unchanged, as a client library expects them.
    pub fn canonical() -> Self {
        Self::new(
            ["1m", "15m", "30m", "1h", "4h", "1d"]
                .into_iter()
                .map(|tf| (tf, tf)),
        )
    }

    /// Resolutions understood by the Indodax chart endpoint (minutes, or `1D`).
    pub fn indodax_chart() -> Self {
        Self::new([
            ("1m", "1"),
            ("15m", "15"),
            ("30m", "30"),
            ("1h", "60"),
            ("4h", "240"),
            ("1d", "1D"),
        ])
    }

    /// Resolve a label to its token, failing for labels the backend does not know.
    pub fn resolve(&self, timeframe: &str) -> Result<&str> {
        self.tokens
            .get(timeframe)
            .map(String::as_str)
            .ok_or_else(|| Error::UnsupportedTimeframe(timeframe.to_string()))
    }

    pub fn contains(&self, timeframe: &str) -> bool {
        self.tokens.contains_key(timeframe)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Maximum candles the exchange returns per call, per timeframe.
///
/// Purely informational: connectors never clamp requests against it, callers
/// use it to size their own chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleLimits {
    pub limits: BTreeMap<String, usize>,
    pub default: usize,
}

impl Default for CandleLimits {
    /// One day of intraday candles, a year of daily ones.
    fn default() -> Self {
        Self::from_entries([
            ("1m", 1440),
            ("15m", 96),
            ("30m", 48),
            ("1h", 24),
            ("4h", 7),
            ("1d", 365),
        ])
    }
}

impl CandleLimits {
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        Self {
            limits: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            default: DEFAULT_CANDLE_LIMIT,
        }
    }

    /// Same limit for every canonical timeframe.
    pub fn uniform(limit: usize) -> Self {
        Self::from_entries(
            Timeframes::canonical()
                .labels()
                .map(|tf| (tf.to_string(), limit))
                .collect::<Vec<_>>(),
        )
    }

    pub fn get(&self, timeframe: &str) -> usize {
        match self.limits.get(timeframe) {
            Some(limit) => *limit,
            None => {
                trace!("No candle limit for {}, using {}", timeframe, self.default);
                self.default
            }
        }
    }

    /// Check every configured label against the backend's timeframes.
    pub fn validate_against(&self, timeframes: &Timeframes) -> Result<()> {
        let unknown: Vec<&str> = self
            .limits
            .keys()
            .map(String::as_str)
            .filter(|tf| !timeframes.contains(tf))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigError(format!(
                "Candle limits configured for unsupported timeframes: {}",
                unknown.join(", ")
            )))
        }
    }
}
