//! HTTP request handlers

use super::state::AppState;
use crate::cache::query_cache_key;
use crate::error::{ApiError, SummaryError};
use crate::results::{AggregateResult, SummaryResult};
use crate::search::{Query, SearchOutcome, SearchType, SourceId};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Body of `POST /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Drug or disease name
    #[serde(default)]
    pub query: String,
    /// "drug" or "disease"; defaults to drug
    #[serde(default, alias = "type")]
    pub search_type: Option<String>,
    /// Source names; absent means every source
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    /// Whether to run the summarizer
    #[serde(default)]
    pub summarize: Option<bool>,
}

/// Body of `POST /api/summarize`
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default, alias = "type")]
    pub search_type: Option<String>,
    /// A previously returned search response
    #[serde(default)]
    pub data: SummarizeData,
}

/// Source results posted back for summarization. The `summary` key of a
/// search response is accepted and dropped.
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeData {
    #[serde(flatten)]
    pub results: AggregateResult,
    #[serde(default, rename = "summary")]
    _summary: Option<IgnoredAny>,
}

/// Search response: the aggregate keyed by source, plus the summary
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub results: AggregateResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryResult>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            results: outcome.results,
            summary: outcome.summary,
        }
    }
}

fn parse_search_type(raw: Option<&str>) -> Result<SearchType, ApiError> {
    match raw {
        None => Ok(SearchType::default()),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid search type: {}", raw))),
    }
}

fn require_query(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("Query is required".into()));
    }
    Ok(())
}

/// Resolve requested source names. Unknown names are dropped with a
/// warning, duplicates collapse.
fn parse_sources(names: Option<&[String]>) -> BTreeSet<SourceId> {
    let Some(names) = names else {
        return SourceId::ALL.into_iter().collect();
    };

    names
        .iter()
        .filter_map(|name| match name.parse::<SourceId>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Ignoring unknown source: {}", name);
                None
            }
        })
        .collect()
}

/// Build a query from a search request, validating it first
pub fn build_query(request: &SearchRequest) -> Result<Query, ApiError> {
    require_query(&request.query)?;
    let search_type = parse_search_type(request.search_type.as_deref())?;

    Ok(Query {
        text: request.query.trim().to_string(),
        search_type,
        sources: parse_sources(request.sources.as_deref()),
    })
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = build_query(&request)?;
    let summarize = request.summarize.unwrap_or(true);

    let key = query_cache_key(&query, summarize);
    if let Some(ref cache) = state.cache {
        if let Some(cached) = cache.get(&key).await {
            info!("Cache hit for '{}'", query.text);
            return Ok(Json(SearchResponse::from(cached.as_ref().clone())));
        }
    }

    let span = info_span!("search", request_id = %Uuid::new_v4(), query = %query.text);
    let outcome = state.search.execute(&query, summarize).instrument(span).await;

    if let Some(ref cache) = state.cache {
        if cache.store(key, &outcome).await {
            debug!("Cached response for '{}'", query.text);
        }
    }

    Ok(Json(SearchResponse::from(outcome)))
}

/// Summarize a previously fetched aggregate
pub async fn summarize(
    State(state): State<AppState>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummaryResult>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    require_query(&request.query)?;
    let search_type = parse_search_type(request.search_type.as_deref())?;

    let data = request.data.results;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Data is required".into()));
    }

    let query = Query {
        text: request.query.trim().to_string(),
        search_type,
        sources: data.keys().collect(),
    };

    let summary = match state.search.summarizer() {
        Some(summarizer) => summarizer.summarize(&query, &data).await,
        None => SummaryError::NotConfigured("summarization is disabled".into()).into(),
    };

    Ok(Json(summary))
}

/// Available sources and their labels
pub async fn sources(State(state): State<AppState>) -> impl IntoResponse {
    let sources: BTreeMap<SourceId, &str> = state
        .search
        .registry()
        .ids()
        .into_iter()
        .map(|id| (id, id.label()))
        .collect();
    Json(sources)
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": crate::VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> SearchRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_query_defaults() {
        let query = build_query(&request(serde_json::json!({"query": " aspirin "}))).unwrap();
        assert_eq!(query.text, "aspirin");
        assert_eq!(query.search_type, SearchType::Drug);
        assert_eq!(query.sources.len(), SourceId::ALL.len());
    }

    #[test]
    fn test_build_query_sources() {
        let query = build_query(&request(serde_json::json!({
            "query": "asthma",
            "type": "disease",
            "sources": ["fda", "FDA", "serper", "ncbi"]
        })))
        .unwrap();

        assert_eq!(query.search_type, SearchType::Disease);
        assert_eq!(
            query.sources.into_iter().collect::<Vec<_>>(),
            vec![SourceId::Fda, SourceId::Ncbi]
        );
    }

    #[test]
    fn test_summarize_data_drops_summary() {
        let request: SummarizeRequest = serde_json::from_value(serde_json::json!({
            "query": "aspirin",
            "data": {
                "sec": {"sourceId": "sec", "status": "error", "items": [], "errorMessage": "timeout"},
                "summary": {"text": "earlier summary"}
            }
        }))
        .unwrap();

        assert_eq!(request.data.results.keys().collect::<Vec<_>>(), vec![SourceId::Sec]);
    }

    #[test]
    fn test_build_query_rejects_bad_input() {
        assert!(matches!(
            build_query(&request(serde_json::json!({"query": "   "}))),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            build_query(&request(serde_json::json!({"query": "x", "search_type": "symptom"}))),
            Err(ApiError::BadRequest(_))
        ));
    }
}
