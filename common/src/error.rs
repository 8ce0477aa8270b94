use thiserror::Error;

/// Boxed cause carried by errors that wrap a collaborator failure.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Timeframe {0} is not supported")]
    UnsupportedTimeframe(String),

    #[error("Exchange request failed for {context}: {source}")]
    ExchangeRequest {
        context: String,
        #[source]
        source: Cause,
    },

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Failed to initialize markets: {0}")]
    MarketInitialization(#[source] Cause),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Exchange API error: {0}")]
    ExchangeError(String),

    #[error("Parsing error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Wrap a collaborator failure, tagging it with the symbol or pair list it was for.
    pub fn request(context: impl Into<String>, source: impl Into<Cause>) -> Self {
        Error::ExchangeRequest {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn market_init(source: impl Into<Cause>) -> Self {
        Error::MarketInitialization(source.into())
    }
}
