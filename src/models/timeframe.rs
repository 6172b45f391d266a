use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar size requested from the market data provider
///
/// Only daily bars: a [`PriceBar`](crate::models::PriceBar) is keyed by
/// calendar date, so finer intervals would collapse into one bar per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    /// Daily candles
    #[default]
    Day1,
}

impl Timeframe {
    /// Convert to the provider's interval string
    pub fn to_interval_string(&self) -> &'static str {
        match self {
            Timeframe::Day1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_interval_string())
    }
}

/// Lookback window for a price history request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    SixMonths,
    Year1,
    Year2,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::SixMonths => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Period::Day1),
            "5d" => Ok(Period::Day5),
            "1mo" => Ok(Period::Month1),
            "3mo" => Ok(Period::Month3),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::Year1),
            "2y" => Ok(Period::Year2),
            _ => Err(format!(
                "Invalid period: '{}'. Valid values: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y",
                s
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
