//! Normalized record shapes, one per source
//!
//! Provider field names stop at the adapter boundary; everything past it
//! speaks in these types. Every struct rejects unknown fields so that the
//! untagged [`Record`] enum can tell the shapes apart when a client posts an
//! aggregate back for summarization.

use serde::{Deserialize, Serialize};

/// One normalized item inside a [`SourceResult`](super::SourceResult)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    DrugLabel(DrugLabel),
    ClinicalTrial(ClinicalTrial),
    Publication(Publication),
    News(NewsArticle),
    SecFiling(SecFiling),
    Concept(SnomedConcept),
    /// Anything a client sent back that matches none of the known shapes
    Other(serde_json::Value),
}

/// FDA structured product label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrugLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indications_and_usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharm_class_epc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharm_class_moa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism_of_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage_and_administration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contraindications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adverse_reactions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_interactions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_pharmacology: Option<String>,
}

/// ClinicalTrials.gov study
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClinicalTrial {
    pub nct_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Comma separated, e.g. "PHASE2, PHASE3"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_drugs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_biologicals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention_others: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_sponsor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_outcomes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Eligibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_results: Option<bool>,
    pub url: String,
}

/// Trial eligibility criteria summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Eligibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy_volunteers: Option<bool>,
}

/// PubMed article summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Publication {
    pub pmid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub url: String,
}

/// Coarse topic of a news article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Regulatory,
    Commercial,
    Clinical,
    #[default]
    Other,
}

/// News search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsArticle {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub category: NewsCategory,
    pub position: u32,
}

/// SEC EDGAR filing mentioning the query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecFiling {
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    pub form: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_ending: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// SNOMED CT concept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnomedConcept {
    pub code: String,
    pub display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub active: bool,
    pub system: String,
}

impl From<DrugLabel> for Record {
    fn from(r: DrugLabel) -> Self {
        Record::DrugLabel(r)
    }
}

impl From<ClinicalTrial> for Record {
    fn from(r: ClinicalTrial) -> Self {
        Record::ClinicalTrial(r)
    }
}

impl From<Publication> for Record {
    fn from(r: Publication) -> Self {
        Record::Publication(r)
    }
}

impl From<NewsArticle> for Record {
    fn from(r: NewsArticle) -> Self {
        Record::News(r)
    }
}

impl From<SecFiling> for Record {
    fn from(r: SecFiling) -> Self {
        Record::SecFiling(r)
    }
}

impl From<SnomedConcept> for Record {
    fn from(r: SnomedConcept) -> Self {
        Record::Concept(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_shapes_are_distinguished() {
        let trial: Record = serde_json::from_value(json!({
            "nct_id": "NCT01",
            "title": "Aspirin study",
            "url": "https://clinicaltrials.gov/study/NCT01"
        }))
        .unwrap();
        assert!(matches!(trial, Record::ClinicalTrial(_)));

        let publication: Record = serde_json::from_value(json!({
            "pmid": "123",
            "title": "A paper",
            "url": "https://pubmed.ncbi.nlm.nih.gov/123/"
        }))
        .unwrap();
        assert!(matches!(publication, Record::Publication(_)));

        let concept: Record = serde_json::from_value(json!({
            "code": "387458008",
            "display": "Aspirin",
            "active": true,
            "system": "http://snomed.info/sct"
        }))
        .unwrap();
        assert!(matches!(concept, Record::Concept(_)));

        let label: Record = serde_json::from_value(json!({"brand_name": "Bayer"})).unwrap();
        assert!(matches!(label, Record::DrugLabel(_)));
    }

    #[test]
    fn test_unknown_shape_falls_through_to_other() {
        let record: Record = serde_json::from_value(json!({"foo": 1})).unwrap();
        assert!(matches!(record, Record::Other(_)));
    }

    #[test]
    fn test_news_category_names() {
        let article = NewsArticle {
            title: "FDA approves".into(),
            link: "https://example.com".into(),
            category: NewsCategory::Regulatory,
            position: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["category"], "regulatory");
        assert!(value.get("snippet").is_none());
    }
}
