use common::{models::CandleLimits, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INDODAX_API_URL: &str = "https://indodax.com/tapi";

/// Which transport backs the connector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Direct calls against the public REST endpoints
    #[default]
    Http,
    /// Forward to an injected exchange client
    Client,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Backend::Http),
            "client" => Ok(Backend::Client),
            other => Err(Error::ConfigError(format!(
                "Unknown backend: {}. Supported backends: http, client",
                other
            ))),
        }
    }
}

/// When the market cache gets populated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketInit {
    /// On first `markets()` access
    #[default]
    Lazy,
    /// During construction; a failure aborts construction
    Eager,
}

impl FromStr for MarketInit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lazy" => Ok(MarketInit::Lazy),
            "eager" => Ok(MarketInit::Eager),
            other => Err(Error::ConfigError(format!(
                "Unknown market init mode: {}. Supported modes: lazy, eager",
                other
            ))),
        }
    }
}

/// API credentials handed to the exchange client
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty() && self.api_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration shared by both connector backends
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Check the candle-limit table against the backend's timeframes at construction
    pub validate: bool,
    pub backend: Backend,
    pub market_init: MarketInit,
    pub candle_limits: CandleLimits,
    /// Base URL for the HTTP backend
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            validate: false,
            backend: Backend::default(),
            market_init: MarketInit::default(),
            candle_limits: CandleLimits::default(),
            base_url: INDODAX_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ExchangeConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>, validate: bool) -> Self {
        Self {
            credentials: Credentials::new(api_key, api_secret),
            validate,
            ..Self::default()
        }
    }

    /// Create a new exchange configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup("INDODAX_API_KEY") {
            config.credentials.api_key = key;
        }
        if let Some(secret) = lookup("INDODAX_API_SECRET") {
            config.credentials.api_secret = secret;
        }
        if let Some(validate) = lookup("INDODAX_VALIDATE") {
            config.validate = parse_bool("INDODAX_VALIDATE", &validate)?;
        }
        if let Some(backend) = lookup("INDODAX_BACKEND") {
            config.backend = backend.parse()?;
        }
        if let Some(mode) = lookup("INDODAX_MARKET_INIT") {
            config.market_init = mode.parse()?;
        }
        if let Some(limits) = lookup("INDODAX_CANDLE_LIMITS") {
            config.candle_limits = serde_json::from_str(&limits).map_err(|e| {
                Error::ConfigError(format!("INDODAX_CANDLE_LIMITS is not valid JSON: {}", e))
            })?;
        }
        if let Some(url) = lookup("INDODAX_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = lookup("INDODAX_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| {
                Error::ConfigError(format!("INDODAX_TIMEOUT_SECS must be an integer, got {}", timeout))
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(Error::ConfigError(format!(
            "{} must be a boolean, got {}",
            name, other
        ))),
    }
}
