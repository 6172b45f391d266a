pub mod analyze;
pub mod price;
pub mod serve;

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{TechnicalAnalyzer, YahooChartClient};
use std::sync::Arc;

/// Analyzer backed by the live Yahoo chart API
fn live_analyzer(config: &AppConfig) -> Result<TechnicalAnalyzer> {
    let fetcher = Arc::new(YahooChartClient::new(config)?);
    Ok(TechnicalAnalyzer::new(fetcher, config.analysis_period))
}

/// Print a command failure and exit non-zero
fn exit_with_error(err: impl std::fmt::Display) -> ! {
    eprintln!("❌ Error: {}", err);
    std::process::exit(1);
}
