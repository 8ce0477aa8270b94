mod candle;
mod market;
mod pair;
mod timeframe;

pub use candle::{Candle, CandleType};
pub use market::{
    Balance, CurrencyBalance, MarketInfo, MarketLimits, MarketPrecision, Markets, OrderBook,
    PriceLevel, Ticker, TradingMode,
};
pub use pair::TradingPair;
pub use timeframe::{CandleLimits, Timeframes, DEFAULT_CANDLE_LIMIT};
