//! Service configuration
//!
//! Built once at startup from environment variables and handed to the
//! provider clients and the server. Nothing reads API keys from ambient
//! globals after this point.

use crate::error::{AppError, Result};
use crate::models::Period;
use crate::utils::env_or;
use std::time::Duration;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:5173,http://localhost:8080,http://127.0.0.1:5173";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub yahoo_base_url: String,
    pub alpha_vantage_base_url: String,
    pub alpha_vantage_api_key: String,
    /// Upper bound for any single provider call
    pub provider_timeout: Duration,
    /// Lookback window fetched for technical analysis
    pub analysis_period: Period,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            alpha_vantage_base_url: DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string(),
            alpha_vantage_api_key: "demo".to_string(),
            provider_timeout: Duration::from_secs(10),
            analysis_period: Period::SixMonths,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, using defaults for anything unset
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = env_or("PORT", &defaults.port.to_string())
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("invalid PORT: {}", e)))?;

        let timeout_secs = env_or("PROVIDER_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("invalid PROVIDER_TIMEOUT_SECS: {}", e)))?;
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "PROVIDER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let analysis_period = Period::from_str(&env_or("ANALYSIS_PERIOD", defaults.analysis_period.as_str()))
            .map_err(AppError::Config)?;

        Ok(Self {
            host: env_or("HOST", &defaults.host),
            port,
            yahoo_base_url: env_or("YAHOO_BASE_URL", DEFAULT_YAHOO_BASE_URL),
            alpha_vantage_base_url: env_or("ALPHA_VANTAGE_BASE_URL", DEFAULT_ALPHA_VANTAGE_BASE_URL),
            alpha_vantage_api_key: env_or("ALPHA_VANTAGE_API_KEY", &defaults.alpha_vantage_api_key),
            provider_timeout: Duration::from_secs(timeout_secs),
            analysis_period,
            cors_origins: split_origins(&env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
        })
    }

    /// Override host/port (CLI flags win over the environment)
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
