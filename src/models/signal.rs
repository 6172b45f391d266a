use crate::constants::MIN_BARS_FOR_SIGNAL;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading decision derived from a MACD crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decide Buy/Sell/Hold from the crossover between the last two bars
///
/// * Buy: MACD was at or below the signal line and is now above it
/// * Sell: MACD was at or above the signal line and is now below it
/// * Hold: anything else, including NaN comparisons
///
/// # Errors
/// `InsufficientData` when fewer than 3 aligned values are available
pub fn decide_signal(macd: &[f64], signal_line: &[f64]) -> Result<Signal> {
    let len = macd.len().min(signal_line.len());
    if len < MIN_BARS_FOR_SIGNAL {
        return Err(AppError::InsufficientData {
            required: MIN_BARS_FOR_SIGNAL,
            actual: len,
        });
    }

    let (prev_macd, prev_signal) = (macd[len - 2], signal_line[len - 2]);
    let (last_macd, last_signal) = (macd[len - 1], signal_line[len - 1]);

    let signal = if prev_macd <= prev_signal && last_macd > last_signal {
        Signal::Buy
    } else if prev_macd >= prev_signal && last_macd < last_signal {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Ok(signal)
}
