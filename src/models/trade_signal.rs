use crate::models::Signal;
use serde::Serialize;

/// Result of the technical-analysis pipeline for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    pub ticker: String,
    pub signal: Signal,
    pub entry_price: f64,
    /// `null` when ATR is not positive
    pub stop_loss: Option<f64>,
    /// `null` when ATR is not positive
    pub target_price: Option<f64>,
    pub atr: f64,
    pub timestamp: String,
}

/// Price analysis over a short daily window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub stock_symbol: String,
    pub current_price: f64,
    pub change_percent: f64,
    pub volatility: Option<f64>,
    pub timestamp: String,
}
