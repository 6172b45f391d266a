//! Market data provider
//!
//! [`SeriesFetcher`] is the seam between the analysis pipeline and whatever
//! supplies daily OHLC history. The production implementation talks to the
//! Yahoo Finance v8 chart API; tests substitute in-memory fetchers.

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::{Period, PriceBar, PriceSeries, Timeframe};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Source of OHLC price history
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// Fetch bars for `symbol` over `period` at `interval`
    ///
    /// An unknown symbol yields an empty series, not an error. Transport and
    /// upstream failures are `Provider`/`RateLimit` errors.
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Timeframe,
    ) -> Result<PriceSeries>;
}

/// Yahoo Finance v8 chart API response
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance chart client
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: Client,
    base_url: Url,
}

impl YahooChartClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.provider_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(config.yahoo_base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Config(format!("invalid YAHOO_BASE_URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "invalid YAHOO_BASE_URL: {}",
                config.yahoo_base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Chart URL for one symbol; the symbol is always a single encoded path segment
    fn chart_url(&self, symbol: &str, period: Period, interval: Timeframe) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("YAHOO_BASE_URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", period.as_str())
            .append_pair("interval", interval.to_interval_string());
        Ok(url)
    }
}

#[async_trait]
impl SeriesFetcher for YahooChartClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Timeframe,
    ) -> Result<PriceSeries> {
        let url = self.chart_url(symbol, period, interval)?;
        debug!(symbol, %url, "Fetching chart data");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(symbol, "Yahoo chart API rate limit hit");
            return Err(AppError::RateLimit);
        }

        let body = response.text().await?;

        // Yahoo answers unknown symbols with 404 plus a chart error body
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(AppError::Provider(format!(
                "chart request for {} failed with HTTP {}",
                symbol, status
            )));
        }

        let parsed: ChartResponse = serde_json::from_str(&body).map_err(|e| {
            AppError::Provider(format!("unexpected chart response for {}: {}", symbol, e))
        })?;

        let series = parse_chart_response(symbol, parsed)?;
        info!(symbol, bars = series.len(), "Fetched price series");
        Ok(series)
    }
}

/// Convert a chart response into a series, dropping bars with any missing price
fn parse_chart_response(symbol: &str, resp: ChartResponse) -> Result<PriceSeries> {
    let Some(results) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code == "Not Found" => Ok(PriceSeries::empty(symbol)),
            Some(err) => Err(AppError::Provider(format!(
                "{}: {}",
                err.code, err.description
            ))),
            None => Ok(PriceSeries::empty(symbol)),
        };
    };

    let Some(data) = results.into_iter().next() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::empty(symbol));
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            warn!(symbol, ts, "Skipping bar with invalid timestamp");
            continue;
        };

        match (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                bars.push(PriceBar::new(date, open, high, low, close));
            }
            // non-trading days come back as nulls
            _ => continue,
        }
    }

    Ok(PriceSeries::new(symbol, bars))
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
