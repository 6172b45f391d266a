use super::{exit_with_error, live_analyzer};
use crate::config::AppConfig;
use crate::error::{AppError, Result};

pub async fn run(symbol: &str) {
    match price(symbol).await {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(e),
    }
}

async fn price(symbol: &str) -> Result<String> {
    let config = AppConfig::from_env()?;
    let analyzer = live_analyzer(&config)?;
    let snapshot = analyzer.price_snapshot(symbol).await?;

    serde_json::to_string_pretty(&snapshot)
        .map_err(|e| AppError::Other(format!("failed to encode snapshot: {}", e)))
}
