use crate::constants::TIMESTAMP_FORMAT;
use chrono::{DateTime, NaiveDate, Utc};

/// Read an environment variable, falling back to `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a calendar date as a midnight timestamp ("2024-06-14 00:00:00")
pub fn format_date_timestamp(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d 00:00:00").to_string()
}

/// Format a UTC time as "YYYY-MM-DD HH:MM:SS"
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Normalize a user-supplied ticker symbol (trim + uppercase)
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}
