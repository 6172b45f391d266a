use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Per-request metrics, emitted as one summary log line when the handler finishes
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: ApiStatus,
    pub endpoint: String,
    pub symbol: Option<String>,
    pub http_status: u16,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Success,
    Fail,
}

impl RequestMetrics {
    pub fn start(endpoint: &str) -> Self {
        Self::new(endpoint, Utc::now())
    }

    pub fn new(endpoint: &str, start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: start_time,
            duration_ms: 0,
            status: ApiStatus::Success,
            endpoint: endpoint.to_string(),
            symbol: None,
            http_status: 200,
            error_message: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Mark the request as failed with the status it will answer with
    pub fn fail(&mut self, http_status: u16, message: impl Into<String>) {
        self.status = ApiStatus::Fail;
        self.http_status = http_status;
        self.error_message = Some(message.into());
    }

    pub fn complete_at(&mut self, end_time: DateTime<Utc>) {
        self.end_time = end_time;
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds().max(0) as u64;
    }

    /// Stop the clock and write the summary line
    pub fn finish(mut self) {
        self.complete_at(Utc::now());
        log_request(&self);
    }
}

fn format_duration(duration_ms: u64) -> String {
    if duration_ms >= 1000 {
        format!("{}.{:01}s", duration_ms / 1000, (duration_ms % 1000) / 100)
    } else {
        format!("{}ms", duration_ms)
    }
}

/// Write the compact request summary through tracing
pub fn log_request(metrics: &RequestMetrics) {
    let duration = format_duration(metrics.duration_ms);
    let symbol = metrics.symbol.as_deref().unwrap_or("-");

    match metrics.status {
        ApiStatus::Success => info!(
            endpoint = %metrics.endpoint,
            symbol,
            status = metrics.http_status,
            duration = %duration,
            "OK"
        ),
        ApiStatus::Fail => warn!(
            endpoint = %metrics.endpoint,
            symbol,
            status = metrics.http_status,
            duration = %duration,
            error = metrics.error_message.as_deref().unwrap_or(""),
            "FAIL"
        ),
    }
}
