//! Per-source and aggregate result types

use super::records::Record;
use crate::error::{SourceError, SummaryError};
use crate::search::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome status of one provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Error,
}

/// Normalized outcome of one provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub source_id: SourceId,
    pub status: SourceStatus,
    #[serde(default)]
    pub items: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SourceResult {
    pub fn ok(source_id: SourceId, items: Vec<Record>) -> Self {
        Self {
            source_id,
            status: SourceStatus::Ok,
            items,
            error_message: None,
        }
    }

    pub fn error(source_id: SourceId, message: impl Into<String>) -> Self {
        Self {
            source_id,
            status: SourceStatus::Error,
            items: Vec::new(),
            error_message: Some(message.into()),
        }
    }

    pub fn from_error(source_id: SourceId, error: &SourceError) -> Self {
        Self::error(source_id, error.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == SourceStatus::Ok
    }
}

/// Merged per-query map of source outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult {
    results: BTreeMap<SourceId, SourceResult>,
}

impl AggregateResult {
    pub(crate) fn from_map(results: BTreeMap<SourceId, SourceResult>) -> Self {
        Self { results }
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceResult> {
        self.results.get(&id)
    }

    pub fn keys(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.results.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &SourceResult)> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when every source in the aggregate succeeded
    pub fn all_ok(&self) -> bool {
        self.results.values().all(SourceResult::is_ok)
    }

    pub fn error_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_ok()).count()
    }
}

/// Narrative summary, or the reason it could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryResult {
    Text { text: String },
    Error { error: String },
}

impl SummaryResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Error { .. } => None,
        }
    }

    pub fn as_error(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Text { .. } => None,
        }
    }
}

impl From<SummaryError> for SummaryResult {
    fn from(err: SummaryError) -> Self {
        Self::error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_result_serialization() {
        let result = SourceResult::from_error(SourceId::ClinicalTrials, &SourceError::Timeout);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({
                "sourceId": "clinical_trials",
                "status": "error",
                "items": [],
                "errorMessage": "timeout"
            })
        );
    }

    #[test]
    fn test_summary_shapes() {
        assert_eq!(
            serde_json::to_value(SummaryResult::text("ok")).unwrap(),
            json!({"text": "ok"})
        );
        assert_eq!(
            serde_json::to_value(SummaryResult::from(SummaryError::EmptyOutput)).unwrap(),
            json!({"error": "model returned empty output"})
        );

        let parsed: SummaryResult = serde_json::from_value(json!({"error": "x"})).unwrap();
        assert!(parsed.is_error());
    }

    #[test]
    fn test_aggregate_counts() {
        let mut map = BTreeMap::new();
        map.insert(SourceId::Fda, SourceResult::ok(SourceId::Fda, vec![]));
        map.insert(SourceId::Sec, SourceResult::error(SourceId::Sec, "boom"));
        let aggregate = AggregateResult::from_map(map);

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.error_count(), 1);
        assert!(!aggregate.all_ok());
    }
}
