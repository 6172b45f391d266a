//! Indicator and Pipeline Constants
//!
//! Window lengths and limits shared by the indicator engine, the signal
//! decider and the risk sizer.
//!
//! ## Warm-up
//!
//! The slow EMA (span 26) needs 26 bars before MACD is considered valid, so
//! technical analysis rejects shorter series. The signal decider compares the
//! last two bars and additionally needs a well-defined previous pair (3 bars).

/// Fast EMA span for MACD
pub const EMA_FAST_SPAN: usize = 12;

/// Slow EMA span for MACD
pub const EMA_SLOW_SPAN: usize = 26;

/// Span of the EMA applied to MACD to produce the signal line
pub const MACD_SIGNAL_SPAN: usize = 9;

/// Trailing window for the ATR rolling mean
pub const ATR_WINDOW: usize = 14;

/// Minimum number of bars required to compute the indicator frame
pub const MIN_BARS_FOR_INDICATORS: usize = EMA_SLOW_SPAN;

/// Minimum number of bars required by the crossover decision
pub const MIN_BARS_FOR_SIGNAL: usize = 3;

/// Stop-loss distance in ATR units
pub const RISK_MULTIPLIER: f64 = 1.0;

/// Lower bound applied to the caller's risk/reward ratio
pub const MIN_RISK_REWARD: f64 = 1.5;

/// Upper bound applied to the caller's risk/reward ratio
pub const MAX_RISK_REWARD: f64 = 5.0;

/// Ratio used when a request does not supply one (1:2.5)
pub const DEFAULT_RISK_REWARD: f64 = 2.5;

/// Maximum number of news articles returned per symbol
pub const NEWS_LIMIT: usize = 5;

/// Symbol used by the news feed when none is given
pub const DEFAULT_NEWS_SYMBOL: &str = "TSLA";

/// Timestamp format used in API responses
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
