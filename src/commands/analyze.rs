use super::{exit_with_error, live_analyzer};
use crate::config::AppConfig;
use crate::error::{AppError, Result};

pub async fn run(symbol: &str, risk_reward: Option<f64>) {
    match analyze(symbol, risk_reward).await {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(e),
    }
}

async fn analyze(symbol: &str, risk_reward: Option<f64>) -> Result<String> {
    let config = AppConfig::from_env()?;
    let analyzer = live_analyzer(&config)?;
    let signal = analyzer.analyze(symbol, risk_reward).await?;

    serde_json::to_string_pretty(&signal)
        .map_err(|e| AppError::Other(format!("failed to encode signal: {}", e)))
}
