//! Error types shared across the crate
//!
//! Provider and summarization failures are captured as data in the response
//! body. Only [`ApiError`] ever turns into a non-2xx HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of a single provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("timeout")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("rate limited by provider")]
    TooManyRequests,

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("source misconfigured: {0}")]
    Config(String),

    #[error("source not available")]
    Unavailable,

    #[error("adapter crashed: {0}")]
    Panicked(String),
}

impl SourceError {
    /// Classify an error raised while talking to a provider
    pub fn classify(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<SourceError>() {
            return err.clone();
        }
        if let Some(err) = err.downcast_ref::<reqwest::Error>() {
            if err.is_timeout() {
                return Self::Timeout;
            }
            if let Some(status) = err.status() {
                return Self::from_status(status.as_u16());
            }
            if err.is_decode() {
                return Self::Parse(err.to_string());
            }
            return Self::Network(err.to_string());
        }
        if let Some(err) = err.downcast_ref::<serde_json::Error>() {
            return Self::Parse(err.to_string());
        }
        Self::Network(err.to_string())
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::TooManyRequests,
            _ => Self::Http(status),
        }
    }
}

/// Failure of the summarization call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("timeout")]
    Timeout,

    #[error("summarization is not configured: {0}")]
    NotConfigured(String),

    #[error("model API error: {0}")]
    Api(String),

    #[error("model returned empty output")]
    EmptyOutput,
}

/// Errors returned to HTTP clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("too many requests, retry later")]
    RateLimited,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_stable() {
        assert_eq!(SourceError::Timeout.to_string(), "timeout");
        assert_eq!(SummaryError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn status_classification() {
        assert_eq!(SourceError::from_status(429), SourceError::TooManyRequests);
        assert_eq!(SourceError::from_status(503), SourceError::Http(503));
        assert_eq!(SourceError::Http(503).to_string(), "HTTP error: 503");
    }

    #[test]
    fn classify_passes_through_source_errors() {
        let err = anyhow::Error::new(SourceError::Config("missing key".into()));
        assert_eq!(
            SourceError::classify(&err),
            SourceError::Config("missing key".into())
        );
    }

    #[test]
    fn classify_json_errors_as_parse() {
        let err: anyhow::Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(SourceError::classify(&err), SourceError::Parse(_)));
    }

    #[test]
    fn api_error_statuses() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
