//! Summarizer backed by an OpenAI-compatible chat completions API

use super::prompt;
use super::traits::Summarizer;
use crate::config::LlmSettings;
use crate::error::SummaryError;
use crate::network::HttpClient;
use crate::results::{AggregateResult, SummaryResult};
use crate::search::Query;
use crate::sources::ProviderRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Hosted-model summarizer (Groq by default)
pub struct LlmSummarizer {
    client: HttpClient,
    settings: LlmSettings,
}

impl LlmSummarizer {
    pub fn new(client: HttpClient, settings: LlmSettings) -> Self {
        Self { client, settings }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        api_key: &str,
        query: &Query,
        aggregate: &AggregateResult,
    ) -> ProviderRequest {
        let user = prompt::user_prompt(
            query,
            aggregate,
            self.settings.max_items_per_source,
            self.settings.max_context_chars,
        );

        ProviderRequest::post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(json!({
                "model": self.settings.model,
                "messages": [
                    {"role": "system", "content": prompt::SYSTEM_PROMPT},
                    {"role": "user", "content": user},
                ],
                "max_tokens": self.settings.max_tokens,
                "temperature": self.settings.temperature,
            }))
    }

    async fn complete(
        &self,
        query: &Query,
        aggregate: &AggregateResult,
    ) -> Result<String, SummaryError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SummaryError::NotConfigured("missing API key".into()))?;

        let request = self.build_request(api_key, query, aggregate);
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| SummaryError::Api(e.to_string()))?;

        if !response.is_success() {
            return Err(SummaryError::Api(format!("HTTP {}", response.status)));
        }

        let json: Value = response
            .json()
            .map_err(|e| SummaryError::Api(format!("invalid response: {}", e)))?;

        json.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(SummaryError::EmptyOutput)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, query: &Query, aggregate: &AggregateResult) -> SummaryResult {
        let start = Instant::now();
        let limit = self.settings.call_timeout();

        let outcome = match timeout(limit, self.complete(query, aggregate)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SummaryError::Timeout),
        };

        match outcome {
            Ok(text) => {
                debug!("Summary for '{}' generated in {:?}", query.text, start.elapsed());
                SummaryResult::text(text)
            }
            Err(e) => {
                warn!("Summarization for '{}' failed: {}", query.text, e);
                e.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchType;

    #[tokio::test]
    async fn test_missing_key_is_summary_error() {
        let summarizer = LlmSummarizer::new(HttpClient::new().unwrap(), LlmSettings::default());
        let result = summarizer
            .summarize(&Query::new("aspirin", SearchType::Drug), &AggregateResult::default())
            .await;

        assert!(result.is_error());
        assert_eq!(
            result.as_error(),
            Some("summarization is not configured: missing API key")
        );
    }

    #[tokio::test]
    async fn test_unusable_timeout_does_not_panic() {
        for timeout in [-1.0, f64::NAN, 1e20] {
            let settings = LlmSettings {
                timeout,
                ..Default::default()
            };
            let summarizer = LlmSummarizer::new(HttpClient::new().unwrap(), settings);
            let result = summarizer
                .summarize(&Query::new("aspirin", SearchType::Drug), &AggregateResult::default())
                .await;
            assert!(result.is_error());
        }
    }

    #[test]
    fn test_request_shape() {
        let settings = LlmSettings {
            base_url: "https://llm.example.com/v1/".into(),
            ..Default::default()
        };
        let summarizer = LlmSummarizer::new(HttpClient::new().unwrap(), settings);
        let request = summarizer.build_request(
            "k",
            &Query::new("aspirin", SearchType::Drug),
            &AggregateResult::default(),
        );

        assert_eq!(request.url, "https://llm.example.com/v1/chat/completions");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer k")
        );
        let body = request.body.unwrap();
        assert_eq!(body["model"], "llama3-70b-8192");
        assert_eq!(body["messages"][1]["role"], "user");
    }
}
