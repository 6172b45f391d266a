use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not enough price history: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Indicator unavailable: {0}")]
    IndicatorUnavailable(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// HTTP status used when this error reaches a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientData { .. } | AppError::IndicatorUnavailable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Provider(format!("request timed out: {}", err))
        } else if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            AppError::RateLimit
        } else {
            AppError::Provider(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(format!("IO error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InsufficientData { required: 26, actual: 3 }.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Provider("down".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::RateLimit.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = AppError::InsufficientData { required: 26, actual: 20 };
        assert_eq!(
            err.to_string(),
            "Not enough price history: need at least 26 bars, got 20"
        );
    }
}
