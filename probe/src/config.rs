use serde::{Deserialize, Serialize};

/// What the probe queries
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    pub pair: String,
    pub timeframe: String,
    pub limit: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            pair: "BTC/IDR".to_string(),
            timeframe: "1h".to_string(),
            limit: 10,
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pair = std::env::var("PROBE_PAIR").unwrap_or(defaults.pair);
        let timeframe = std::env::var("PROBE_TIMEFRAME").unwrap_or(defaults.timeframe);
        let limit = std::env::var("PROBE_LIMIT")
            .ok()
            .and_then(|l| l.parse().ok())
            .unwrap_or(defaults.limit);

        Self {
            pair,
            timeframe,
            limit,
        }
    }
}
