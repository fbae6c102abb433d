//! Query and source identifier models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a supported external data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Fda,
    ClinicalTrials,
    Ncbi,
    News,
    Sec,
    Snomed,
}

impl SourceId {
    /// Every supported source, in display order
    pub const ALL: [SourceId; 6] = [
        SourceId::Fda,
        SourceId::ClinicalTrials,
        SourceId::Ncbi,
        SourceId::News,
        SourceId::Sec,
        SourceId::Snomed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fda => "fda",
            Self::ClinicalTrials => "clinical_trials",
            Self::Ncbi => "ncbi",
            Self::News => "news",
            Self::Sec => "sec",
            Self::Snomed => "snomed",
        }
    }

    /// Human readable label shown by clients
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fda => "FDA Drug Information",
            Self::ClinicalTrials => "Clinical Trials",
            Self::Ncbi => "NCBI Publications",
            Self::News => "Latest News",
            Self::Sec => "SEC Company Information",
            Self::Snomed => "SNOMED-CT Medical Terminology",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown source: {}", s))
    }
}

/// Whether the query names a drug or a disease
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Drug,
    Disease,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drug => "drug",
            Self::Disease => "disease",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drug" => Ok(Self::Drug),
            "disease" => Ok(Self::Disease),
            other => Err(anyhow::anyhow!("Unknown search type: {}", other)),
        }
    }
}

/// A single user query, immutable once issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The drug or disease name
    pub text: String,
    /// Drug or disease search
    pub search_type: SearchType,
    /// Sources to query
    pub sources: BTreeSet<SourceId>,
}

impl Query {
    /// Create a query against every supported source
    pub fn new(text: impl Into<String>, search_type: SearchType) -> Self {
        Self {
            text: text.into(),
            search_type,
            sources: SourceId::ALL.into_iter().collect(),
        }
    }

    /// Restrict the query to the given sources
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SourceId>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_round_trip_names() {
        for id in SourceId::ALL {
            assert_eq!(id.as_str().parse::<SourceId>().unwrap(), id);
        }
        assert_eq!(" FDA ".parse::<SourceId>().unwrap(), SourceId::Fda);
        assert!("serper".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_source_id_serde_names() {
        let json = serde_json::to_string(&SourceId::ClinicalTrials).unwrap();
        assert_eq!(json, "\"clinical_trials\"");
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("aspirin", SearchType::Drug)
            .with_sources([SourceId::Fda, SourceId::Fda, SourceId::News]);

        assert_eq!(query.sources.len(), 2);
        assert_eq!(query.text, "aspirin");
    }

    #[test]
    fn test_search_type_parse() {
        assert_eq!("Disease".parse::<SearchType>().unwrap(), SearchType::Disease);
        assert!("symptom".parse::<SearchType>().is_err());
        assert_eq!(SearchType::default(), SearchType::Drug);
    }
}
