//! Source traits and request/response types

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::results::{Record, SourceResult};
use crate::search::{Query, SourceId};
use async_trait::async_trait;
use std::collections::HashMap;

/// Anything that can turn a query into a [`SourceResult`].
///
/// Implementations never fail past this boundary: every problem becomes an
/// error-status result. The orchestrator only sees this trait, so tests can
/// swap in fakes that never touch the network.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Which source this adapter serves
    fn id(&self) -> SourceId;

    /// Fetch and normalize records for a query
    async fn fetch(&self, query: &Query) -> SourceResult;
}

/// HTTP request to be made to a provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter when a value is present
    pub fn param_opt(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.param(key, v),
            _ => self,
        }
    }

    /// Set a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// HTTP response from a provider
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl ProviderResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx status into a [`SourceError`]
    pub fn error_for_status(&self) -> anyhow::Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(SourceError::from_status(self.status).into())
        }
    }
}

/// What a source wants after reading a response
#[derive(Debug)]
pub enum SourceStep {
    /// Normalized records, the fetch is complete
    Done(Vec<Record>),
    /// The provider splits lookup across two endpoints; issue this next
    FollowUp(ProviderRequest),
}

/// A provider that speaks HTTP, described as request building plus
/// response normalization. [`HttpAdapter`](super::HttpAdapter) drives it.
pub trait Source: Send + Sync {
    /// Source identifier
    fn id(&self) -> SourceId;

    /// Provider metadata
    fn about(&self) -> SourceAbout {
        SourceAbout::default()
    }

    /// Default timeout in seconds
    fn timeout(&self) -> f64 {
        crate::DEFAULT_TIMEOUT as f64
    }

    /// Build the HTTP request for a query
    fn request(&self, query: &Query) -> anyhow::Result<ProviderRequest>;

    /// Normalize the HTTP response
    fn response(&self, query: &Query, response: ProviderResponse) -> anyhow::Result<SourceStep>;

    /// Apply configuration (called once on startup)
    fn init(&mut self, _config: &SourceConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Validate configuration after init
    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Source metadata
#[derive(Debug, Clone, Default)]
pub struct SourceAbout {
    /// Whether an API key is required
    pub require_api_key: bool,
}

impl SourceAbout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key_required(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ProviderRequest::post("https://example.com/api")
            .header("X-API-KEY", "k")
            .param("q", "aspirin")
            .param_opt("api_key", None)
            .param_opt("email", Some(""))
            .json(serde_json::json!({"q": "aspirin"}));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.params.len(), 1);
        assert_eq!(request.headers.get("X-API-KEY").map(String::as_str), Some("k"));
        assert!(request.body.is_some());
    }

    #[test]
    fn test_response_status() {
        let response = ProviderResponse {
            status: 204,
            text: String::new(),
            url: "https://example.com".into(),
        };
        assert!(response.is_success());
        assert!(response.error_for_status().is_ok());
        assert!(response.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_error_for_status() {
        let response = ProviderResponse {
            status: 503,
            text: "unavailable".into(),
            url: "https://example.com".into(),
        };
        let err = response.error_for_status().unwrap_err();
        assert_eq!(SourceError::classify(&err), SourceError::Http(503));
    }
}
