//! Technical indicators computed over a price series
//!
//! # Conventions
//! - EMAs are seeded with the first input value (no simple-average warm-up),
//!   so every bar has a value and early bars lean on the seed.
//! - True range of bar 0 is `high - low` since there is no previous close.
//! - ATR is a simple trailing mean of true range with a minimum window of 1:
//!   the first 13 bars average whatever history exists.

use crate::constants::{
    ATR_WINDOW, EMA_FAST_SPAN, EMA_SLOW_SPAN, MACD_SIGNAL_SPAN, MIN_BARS_FOR_INDICATORS,
};
use crate::error::{AppError, Result};
use crate::models::{PriceBar, PriceSeries};
use serde::Serialize;

/// Calculate an Exponential Moving Average
///
/// Smoothing factor `α = 2 / (span + 1)`, recurrence
/// `ema[i] = value[i] * α + ema[i-1] * (1 - α)`, seeded with `values[0]`.
///
/// # Returns
/// * Vector aligned with `values` (empty input gives empty output)
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut ema_values = Vec::with_capacity(values.len());
    let Some(&seed) = values.first() else {
        return ema_values;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut previous = seed;
    ema_values.push(previous);

    for &value in &values[1..] {
        previous = value * alpha + previous * (1.0 - alpha);
        ema_values.push(previous);
    }

    ema_values
}

/// MACD components for a close series
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal_line: Vec<f64>,
}

/// Calculate EMA12, EMA26, MACD (= EMA12 - EMA26) and the 9-span signal line
pub fn calculate_macd(closes: &[f64]) -> MacdSeries {
    let ema_fast = calculate_ema(closes, EMA_FAST_SPAN);
    let ema_slow = calculate_ema(closes, EMA_SLOW_SPAN);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_line = calculate_ema(&macd, MACD_SIGNAL_SPAN);

    MacdSeries {
        ema_fast,
        ema_slow,
        macd,
        signal_line,
    }
}

/// Calculate True Range for every bar
///
/// `TR[i] = max(high - low, |high - prev_close|, |low - prev_close|)`,
/// `TR[0] = high - low`.
pub fn calculate_true_range(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            if i == 0 {
                return range;
            }
            let prev_close = bars[i - 1].close;
            range
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

/// Trailing simple mean over at most `window` values, minimum window 1
///
/// Non-finite inputs are skipped. A position whose window holds no finite
/// value yields `None`.
pub fn calculate_rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = values[start..=i]
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                None
            } else {
                Some(sum / count as f64)
            }
        })
        .collect()
}

/// Calculate percentage change: ((current - previous) / previous) * 100
///
/// Returns 0.0 when `previous` is zero.
pub fn calculate_change_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        ((current - previous) / previous) * 100.0
    }
}

/// Volatility as the sample standard deviation of bar-to-bar returns, in percent
///
/// Returns `None` with fewer than two returns (the sample deviation is undefined).
pub fn calculate_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() * 100.0)
}

/// Indicator values for a single bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub ema12: f64,
    pub ema26: f64,
    pub macd: f64,
    pub signal_line: f64,
    pub true_range: f64,
    pub atr: Option<f64>,
}

/// Indicator values aligned bar-for-bar with a [`PriceSeries`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Compute the frame for a series of at least 26 bars
    ///
    /// # Errors
    /// * `InsufficientData` when the series is shorter than the EMA26 warm-up
    /// * `IndicatorUnavailable` when the latest MACD, signal or ATR is not a finite number
    pub fn compute(series: &PriceSeries) -> Result<Self> {
        if series.len() < MIN_BARS_FOR_INDICATORS {
            return Err(AppError::InsufficientData {
                required: MIN_BARS_FOR_INDICATORS,
                actual: series.len(),
            });
        }

        let bars = series.bars();
        let MacdSeries {
            ema_fast,
            ema_slow,
            macd,
            signal_line,
        } = calculate_macd(&series.closes());
        let true_range = calculate_true_range(bars);
        let atr = calculate_rolling_mean(&true_range, ATR_WINDOW);

        let rows: Vec<IndicatorRow> = (0..bars.len())
            .map(|i| IndicatorRow {
                ema12: ema_fast[i],
                ema26: ema_slow[i],
                macd: macd[i],
                signal_line: signal_line[i],
                true_range: true_range[i],
                atr: atr[i],
            })
            .collect();

        let frame = Self { rows };
        let last = frame.latest().ok_or_else(|| AppError::InsufficientData {
            required: MIN_BARS_FOR_INDICATORS,
            actual: 0,
        })?;

        if !last.macd.is_finite() || !last.signal_line.is_finite() {
            return Err(AppError::IndicatorUnavailable(format!(
                "MACD could not be computed for {}",
                series.symbol()
            )));
        }
        if !last.atr.is_some_and(f64::is_finite) {
            return Err(AppError::IndicatorUnavailable(format!(
                "ATR could not be computed for {}",
                series.symbol()
            )));
        }

        Ok(frame)
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn macd(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.macd).collect()
    }

    pub fn signal_line(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.signal_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + Duration::days(i as i64), c, c + 1.0, c - 1.0, c))
            .collect();
        PriceSeries::new("TEST", bars)
    }

    #[test]
    fn test_calculate_ema_seeded_with_first_value() {
        // span 3 -> alpha 0.5
        let ema = calculate_ema(&[10.0, 11.0, 12.0], 3);
        assert_eq!(ema, vec![10.0, 10.5, 11.25]);
        assert!(calculate_ema(&[], 12).is_empty());
    }

    #[test]
    fn test_macd_is_fast_minus_slow() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let m = calculate_macd(&closes);
        for i in 0..closes.len() {
            assert_eq!(m.macd[i], m.ema_fast[i] - m.ema_slow[i]);
        }
        assert_eq!(m.macd[0], 0.0);
        assert_eq!(m.signal_line[0], 0.0);
    }

    #[test]
    fn test_macd_positive_for_rising_closes() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let m = calculate_macd(&closes);
        assert!(m.macd.iter().skip(1).all(|&v| v > 0.0));
        assert!(m.macd.iter().zip(&m.signal_line).skip(1).all(|(macd, sig)| macd > sig));
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = vec![
            PriceBar::new(d, 10.0, 12.0, 9.0, 11.0),
            // gap up: |high - prev_close| = 16 - 11 = 5 > high - low = 2
            PriceBar::new(d + Duration::days(1), 15.0, 16.0, 14.0, 15.0),
            // gap down: |low - prev_close| = |10 - 15| = 5 > 3
            PriceBar::new(d + Duration::days(2), 12.0, 13.0, 10.0, 12.0),
        ];
        assert_eq!(calculate_true_range(&bars), vec![3.0, 5.0, 5.0]);
    }

    #[test]
    fn test_rolling_mean_minimum_window() {
        let means = calculate_rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(means, vec![Some(2.0), Some(3.0), Some(4.0), Some(6.0)]);
    }

    #[test]
    fn test_rolling_mean_skips_missing_values() {
        let means = calculate_rolling_mean(&[f64::NAN, 4.0, f64::NAN], 2);
        assert_eq!(means, vec![None, Some(4.0), Some(4.0)]);
    }

    #[test]
    fn test_change_percent() {
        assert!((calculate_change_percent(110.0, 100.0) - 10.0).abs() < 1e-9);
        assert_eq!(calculate_change_percent(110.0, 0.0), 0.0);
    }

    #[test]
    fn test_volatility_sample_std() {
        // returns +10%, -10%: mean 0, sample std = sqrt(0.02 / 1) = 0.1414
        let vol = calculate_volatility(&[100.0, 110.0, 99.0]).unwrap();
        assert!((vol - 14.142).abs() < 0.01);
        assert!(calculate_volatility(&[100.0, 101.0]).is_none());
    }

    #[test]
    fn test_frame_requires_warm_up() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let err = IndicatorFrame::compute(&series_from_closes(&closes)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { required: 26, actual: 25 }));
    }

    #[test]
    fn test_frame_aligned_and_atr_non_negative() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 1.3).cos() * 4.0).collect();
        let frame = IndicatorFrame::compute(&series_from_closes(&closes)).unwrap();
        assert_eq!(frame.len(), 30);
        for row in frame.rows() {
            assert_eq!(row.macd, row.ema12 - row.ema26);
            assert!(row.true_range >= 0.0);
            assert!(row.atr.unwrap() >= 0.0);
        }
        // every bar spans high - low = 2, the first ATR is exactly that range
        assert_eq!(frame.rows()[0].atr, Some(2.0));
    }

    #[test]
    fn test_frame_unavailable_when_last_close_missing() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes[29] = f64::NAN;
        let err = IndicatorFrame::compute(&series_from_closes(&closes)).unwrap_err();
        assert!(matches!(err, AppError::IndicatorUnavailable(_)));
    }
}
