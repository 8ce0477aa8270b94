use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a pair of currencies being traded, e.g. `BTC/IDR`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TradingPair {
    pub base: String,  // Base currency (e.g., BTC)
    pub quote: String, // Quote currency (e.g., IDR)
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Lowercase `base_quote` id used in Indodax paths and query strings.
    pub fn market_id(&self) -> String {
        format!("{}_{}", self.base.to_lowercase(), self.quote.to_lowercase())
    }

    /// Parse an Indodax market id (`btc_idr`) back into a pair.
    pub fn from_market_id(id: &str) -> Result<Self> {
        match id.split_once('_') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(base, quote))
            }
            _ => Err(Error::ParseError(format!("Invalid market id: {}", id))),
        }
    }

    /// Unified `BASE/QUOTE` symbol.
    pub fn symbol(&self) -> String {
        self.to_string()
    }
}

impl FromStr for TradingPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(base, quote))
            }
            _ => Err(Error::ParseError(format!(
                "Invalid pair: {}. Expected BASE/QUOTE",
                s
            ))),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
