//! Technical analysis pipeline
//!
//! fetch -> indicator frame -> crossover decision -> ATR risk sizing -> [`TradeSignal`]
//!
//! [`run_pipeline`] is pure: the generation timestamp is passed in, so the
//! same series always yields the same signal.

use crate::error::{AppError, Result};
use crate::models::indicators::{calculate_change_percent, calculate_volatility};
use crate::models::{
    decide_signal, resolve_risk_reward, size_risk, IndicatorFrame, Period, PriceSeries,
    PriceSnapshot, Timeframe, TradeSignal,
};
use crate::services::market_data::SeriesFetcher;
use crate::utils::{format_date_timestamp, format_timestamp, normalize_symbol, round2};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Run the signal engine over an already fetched series
pub fn run_pipeline(
    series: &PriceSeries,
    risk_reward_ratio: f64,
    timestamp: String,
) -> Result<TradeSignal> {
    let frame = IndicatorFrame::compute(series)?;
    let signal = decide_signal(&frame.macd(), &frame.signal_line())?;

    let entry_price = series
        .latest()
        .map(|bar| bar.close)
        .ok_or_else(|| AppError::NotFound(format!("no price data for {}", series.symbol())))?;
    let atr = frame
        .latest()
        .and_then(|row| row.atr)
        .ok_or_else(|| AppError::IndicatorUnavailable(format!("ATR for {}", series.symbol())))?;

    let levels = size_risk(entry_price, atr, risk_reward_ratio);

    debug!(
        symbol = series.symbol(),
        %signal,
        entry_price,
        atr,
        "Pipeline complete"
    );

    Ok(TradeSignal {
        ticker: series.symbol().to_string(),
        signal,
        entry_price,
        stop_loss: levels.stop_loss,
        target_price: levels.target_price,
        atr,
        timestamp,
    })
}

/// Summarize the latest price, day-over-day change and volatility
///
/// Returns `None` for an empty series.
pub fn summarize_prices(series: &PriceSeries) -> Option<PriceSnapshot> {
    let latest = series.latest()?;
    let closes = series.closes();

    let change_percent = match closes.len() {
        0 | 1 => 0.0,
        n => calculate_change_percent(closes[n - 1], closes[n - 2]),
    };

    Some(PriceSnapshot {
        stock_symbol: series.symbol().to_string(),
        current_price: latest.close,
        change_percent,
        volatility: calculate_volatility(&closes),
        timestamp: format_date_timestamp(&latest.date),
    })
}

/// Entry point for everything that needs fresh prices
#[derive(Clone)]
pub struct TechnicalAnalyzer {
    fetcher: Arc<dyn SeriesFetcher>,
    analysis_period: Period,
}

impl TechnicalAnalyzer {
    pub fn new(fetcher: Arc<dyn SeriesFetcher>, analysis_period: Period) -> Self {
        Self {
            fetcher,
            analysis_period,
        }
    }

    /// True iff the provider returns a non-empty 1-day series
    pub async fn validate_ticker(&self, symbol: &str) -> Result<bool> {
        let symbol = require_symbol(symbol)?;
        let series = self
            .fetcher
            .fetch_series(&symbol, Period::Day1, Timeframe::Day1)
            .await?;
        Ok(!series.is_empty())
    }

    /// Full technical analysis for `symbol`
    #[instrument(skip(self))]
    pub async fn analyze(
        &self,
        symbol: &str,
        risk_reward_ratio: Option<f64>,
    ) -> Result<TradeSignal> {
        let symbol = require_symbol(symbol)?;
        let ratio = resolve_risk_reward(risk_reward_ratio)?;

        if !self.validate_ticker(&symbol).await? {
            return Err(not_found(&symbol));
        }

        let series = self
            .fetcher
            .fetch_series(&symbol, self.analysis_period, Timeframe::Day1)
            .await?;
        if series.is_empty() {
            return Err(not_found(&symbol));
        }

        let signal = run_pipeline(&series, ratio, format_timestamp(&Utc::now()))?;
        info!(
            symbol = %symbol,
            signal = %signal.signal,
            entry_price = signal.entry_price,
            bars = series.len(),
            "Technical analysis complete"
        );
        Ok(signal)
    }

    /// Price analysis over the last month of daily bars
    #[instrument(skip(self))]
    pub async fn price_snapshot(&self, symbol: &str) -> Result<PriceSnapshot> {
        let symbol = require_symbol(symbol)?;
        let series = self
            .fetcher
            .fetch_series(&symbol, Period::Month1, Timeframe::Day1)
            .await?;

        summarize_prices(&series).ok_or_else(|| not_found(&symbol))
    }

    /// Latest close rounded to cents
    pub async fn latest_price(&self, symbol: &str) -> Result<f64> {
        let symbol = require_symbol(symbol)?;
        let series = self
            .fetcher
            .fetch_series(&symbol, Period::Day5, Timeframe::Day1)
            .await?;

        series
            .latest()
            .map(|bar| round2(bar.close))
            .ok_or_else(|| not_found(&symbol))
    }
}

/// Normalize and check a ticker: letters, digits and `.^=-` only
fn require_symbol(raw: &str) -> Result<String> {
    let symbol = normalize_symbol(raw);
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("Stock symbol is required".to_string()));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')))
    {
        return Err(AppError::InvalidInput(format!(
            "Invalid stock symbol '{}': unexpected character '{}'",
            symbol, bad
        )));
    }
    Ok(symbol)
}

fn not_found(symbol: &str) -> AppError {
    AppError::NotFound(format!(
        "No data found for '{}'. Check the symbol or try again later!",
        symbol
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::PriceBar;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory fetcher keyed by symbol; unknown symbols return an empty series
    #[derive(Default)]
    pub struct StubFetcher {
        pub series: HashMap<String, Vec<PriceBar>>,
        pub fail_with_provider_error: bool,
        pub calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn with(symbol: &str, closes: &[f64]) -> Self {
            let mut series = HashMap::new();
            series.insert(symbol.to_string(), bars_from_closes(closes));
            Self {
                series,
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_with_provider_error: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SeriesFetcher for StubFetcher {
        async fn fetch_series(
            &self,
            symbol: &str,
            period: Period,
            _interval: Timeframe,
        ) -> Result<PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_provider_error {
                return Err(AppError::Provider("upstream unavailable".to_string()));
            }
            let bars = self.series.get(symbol).cloned().unwrap_or_default();
            let keep = match period {
                Period::Day1 => 1,
                Period::Day5 => 5,
                Period::Month1 => 21,
                _ => bars.len(),
            };
            let start = bars.len().saturating_sub(keep);
            Ok(PriceSeries::new(symbol, bars[start..].to_vec()))
        }
    }

    /// Daily bars with high/low one unit around each close
    pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c))
            .collect()
    }

    /// A decline followed by a sharp rally, producing a bullish MACD crossover on the last bar
    pub fn crossover_closes() -> Vec<f64> {
        let mut closes = vec![100.0, 101.0, 99.0, 102.0, 105.0, 103.0, 107.0];
        let mut last = 107.0;
        for _ in 0..33 {
            last -= 1.0;
            closes.push(last);
        }
        closes.push(110.0);
        closes
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::Signal;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", bars_from_closes(closes))
    }

    #[test]
    fn test_crossover_scenario_emits_buy() {
        let s = series(&crossover_closes());
        let frame = IndicatorFrame::compute(&s).unwrap();
        let macd = frame.macd();
        let sig = frame.signal_line();
        let n = macd.len();
        assert!(macd[n - 2] <= sig[n - 2]);
        assert!(macd[n - 1] > sig[n - 1]);

        let result = run_pipeline(&s, 2.5, "2024-02-10 12:00:00".to_string()).unwrap();
        let atr = frame.latest().unwrap().atr.unwrap();
        assert_eq!(result.signal, Signal::Buy);
        assert_eq!(result.entry_price, 110.0);
        assert_eq!(result.atr, atr);
        assert_eq!(result.stop_loss, Some(round2(110.0 - atr)));
        assert_eq!(result.target_price, Some(round2(110.0 + 2.5 * atr)));
        assert!(result.stop_loss.unwrap() < 110.0);
        assert!(result.target_price.unwrap() > 110.0);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let s = series(&crossover_closes());
        let a = run_pipeline(&s, 3.0, "t".to_string()).unwrap();
        let b = run_pipeline(&s, 3.0, "t".to_string()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rising_series_never_sells() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        for end in 26..=closes.len() {
            let result = run_pipeline(&series(&closes[..end]), 2.5, String::new()).unwrap();
            assert_ne!(result.signal, Signal::Sell);
        }
    }

    #[test]
    fn test_pipeline_rejects_short_series() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        let err = run_pipeline(&series(&closes), 2.5, String::new()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { required: 26, actual: 20 }));
    }

    #[test]
    fn test_summarize_prices() {
        let snapshot = summarize_prices(&series(&[100.0, 110.0, 99.0])).unwrap();
        assert_eq!(snapshot.current_price, 99.0);
        assert!((snapshot.change_percent - -10.0).abs() < 1e-9);
        assert!((snapshot.volatility.unwrap() - 14.142).abs() < 0.01);
        assert_eq!(snapshot.timestamp, "2024-01-03 00:00:00");

        let single = summarize_prices(&series(&[42.0])).unwrap();
        assert_eq!(single.change_percent, 0.0);
        assert_eq!(single.volatility, None);

        assert!(summarize_prices(&PriceSeries::empty("X")).is_none());
    }

    #[tokio::test]
    async fn test_analyze_unknown_symbol_is_not_found() {
        let analyzer = TechnicalAnalyzer::new(Arc::new(StubFetcher::default()), Period::SixMonths);
        let err = analyzer.analyze("nope", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_analyze_provider_failure_propagates() {
        let analyzer = TechnicalAnalyzer::new(Arc::new(StubFetcher::failing()), Period::SixMonths);
        let err = analyzer.analyze("AAPL", None).await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[tokio::test]
    async fn test_analyze_end_to_end() {
        let fetcher = StubFetcher::with("AAPL", &crossover_closes());
        let analyzer = TechnicalAnalyzer::new(Arc::new(fetcher), Period::SixMonths);
        let result = analyzer.analyze(" aapl ", Some(10.0)).await.unwrap();
        assert_eq!(result.ticker, "AAPL");
        assert_eq!(result.signal, Signal::Buy);
        // ratio clamped to 5.0
        assert_eq!(result.target_price, Some(round2(110.0 + 5.0 * result.atr)));
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_input() {
        let analyzer = TechnicalAnalyzer::new(Arc::new(StubFetcher::default()), Period::SixMonths);
        assert!(matches!(
            analyzer.analyze("   ", None).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            analyzer.analyze("AAPL", Some(f64::INFINITY)).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_require_symbol_charset() {
        assert_eq!(require_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(require_symbol("^gspc").unwrap(), "^GSPC");
        assert_eq!(require_symbol("eurusd=x").unwrap(), "EURUSD=X");
        for bad in ["AAPL#X", "AAPL?RANGE=5Y", "../../V7/FINANCE/QUOTE", "AA PL", "AAPL/"] {
            assert!(
                matches!(require_symbol(bad), Err(AppError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_symbol_never_reaches_provider() {
        use std::sync::atomic::Ordering;

        let fetcher = Arc::new(StubFetcher::with("AAPL", &crossover_closes()));
        let analyzer = TechnicalAnalyzer::new(fetcher.clone(), Period::SixMonths);
        for bad in ["AAPL#X", "AAPL?RANGE=5Y", "../../V7/FINANCE/QUOTE"] {
            assert!(matches!(
                analyzer.analyze(bad, None).await,
                Err(AppError::InvalidInput(_))
            ));
            assert!(matches!(
                analyzer.latest_price(bad).await,
                Err(AppError::InvalidInput(_))
            ));
            assert!(matches!(
                analyzer.validate_ticker(bad).await,
                Err(AppError::InvalidInput(_))
            ));
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_latest_price_rounds() {
        let fetcher = StubFetcher::with("MSFT", &[410.123, 415.456]);
        let analyzer = TechnicalAnalyzer::new(Arc::new(fetcher), Period::SixMonths);
        assert_eq!(analyzer.latest_price("msft").await.unwrap(), 415.46);
    }
}
