//! PubMed search through NCBI E-utilities
//!
//! ESearch returns matching PMIDs, ESummary resolves them to article
//! summaries. The second call is skipped when the first finds nothing.

use super::normalize::{normalize_date, str_at, string_at};
use super::traits::*;
use crate::config::SourceConfig;
use crate::results::{Publication, Record};
use crate::search::{Query, SourceId};
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::debug;

/// Longest publication window accepted, in days
const MAX_DAYS_BACK: i64 = 36_500;

/// NCBI E-utilities PubMed source
pub struct Ncbi {
    base_url: String,
    api_key: Option<String>,
    email: Option<String>,
    tool: String,
    max_results: u32,
    days_back: i64,
}

impl Ncbi {
    pub fn new() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            api_key: None,
            email: None,
            tool: "med-aggregator".to_string(),
            max_results: 20,
            days_back: 90,
        }
    }

    /// Parameters NCBI asks every caller to send
    fn with_identity(&self, request: ProviderRequest) -> ProviderRequest {
        request
            .param("db", "pubmed")
            .param("retmode", "json")
            .param("tool", &self.tool)
            .param_opt("email", self.email.as_deref())
            .param_opt("api_key", self.api_key.as_deref())
    }

    fn summary_request(&self, ids: &[&str]) -> ProviderRequest {
        self.with_identity(ProviderRequest::get(format!("{}/esummary.fcgi", self.base_url)))
            .param("id", ids.join(","))
    }

    fn search_step(&self, json: &Value) -> SourceStep {
        let ids: Vec<&str> = json
            .pointer("/esearchresult/idlist")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        if ids.is_empty() {
            debug!("ESearch returned no ids");
            return SourceStep::Done(Vec::new());
        }
        SourceStep::FollowUp(self.summary_request(&ids))
    }

    fn summary_step(json: &Value) -> Result<SourceStep> {
        let result = json
            .get("result")
            .ok_or_else(|| anyhow!("ESummary response has no result"))?;

        let uids = result
            .get("uids")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let publications = uids
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|uid| Self::parse_summary(uid, result.get(uid)?))
            .map(Record::from)
            .collect();

        Ok(SourceStep::Done(publications))
    }

    fn parse_summary(uid: &str, doc: &Value) -> Option<Publication> {
        // Per-id failures come back inline
        if doc.get("error").is_some() {
            return None;
        }

        let authors = doc
            .get("authors")
            .and_then(Value::as_array)
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(|a| str_at(a, "/name"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|s| !s.is_empty());

        let doi = doc
            .get("articleids")
            .and_then(Value::as_array)
            .and_then(|ids| {
                ids.iter()
                    .find(|id| str_at(id, "/idtype") == Some("doi"))
                    .and_then(|id| string_at(id, "/value"))
            });

        Some(Publication {
            pmid: uid.to_string(),
            title: string_at(doc, "/title")?,
            journal: string_at(doc, "/fulljournalname").or_else(|| string_at(doc, "/source")),
            publication_date: str_at(doc, "/pubdate").map(normalize_date),
            authors,
            doi,
            url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", uid),
        })
    }
}

impl Default for Ncbi {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Ncbi {
    fn id(&self) -> SourceId {
        SourceId::Ncbi
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        let today = Utc::now().date_naive();
        let from = today - Duration::days(self.days_back);

        Ok(
            self.with_identity(ProviderRequest::get(format!("{}/esearch.fcgi", self.base_url)))
                .param("term", format!("{}[Title/Abstract]", query.text.trim()))
                .param("datetype", "pdat")
                .param("mindate", from.format("%Y/%m/%d").to_string())
                .param("maxdate", today.format("%Y/%m/%d").to_string())
                .param("retmax", self.max_results.to_string())
                .param("sort", "relevance"),
        )
    }

    fn response(&self, _query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        response.error_for_status()?;
        let json: Value = response.json()?;

        if json.get("esearchresult").is_some() {
            Ok(self.search_step(&json))
        } else {
            Self::summary_step(&json)
        }
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref key) = config.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(email) = config.extra_str("email") {
            self.email = Some(email.to_string());
        }
        if let Some(tool) = config.extra_str("tool") {
            self.tool = tool.to_string();
        }
        if let Some(days) = config.extra_u64("days_back") {
            self.days_back = i64::try_from(days)
                .map_err(|_| anyhow!("days_back {} is out of range", days))?;
        }
        if let Some(n) = config.max_results {
            self.max_results = n.clamp(1, 200);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if !(1..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(anyhow!("days_back must be between 1 and {}", MAX_DAYS_BACK));
        }
        Ok(())
    }
}
