//! ClinicalTrials.gov v2 study search

use super::normalize::{join_list, normalize_date, str_at, string_at};
use super::traits::*;
use crate::config::SourceConfig;
use crate::results::{ClinicalTrial, Eligibility, Record};
use crate::search::{Query, SourceId};
use anyhow::Result;
use serde_json::Value;

/// ClinicalTrials.gov `/studies`
pub struct ClinicalTrials {
    base_url: String,
    page_size: u32,
}

impl ClinicalTrials {
    pub fn new() -> Self {
        Self {
            base_url: "https://clinicaltrials.gov/api/v2".to_string(),
            page_size: 10,
        }
    }

    fn parse_study(study: &Value) -> Option<ClinicalTrial> {
        let protocol = study.get("protocolSection")?;
        let nct_id = str_at(protocol, "/identificationModule/nctId")?.to_string();

        let (drugs, biologicals, others) = Self::interventions(protocol);

        let enrollment = protocol
            .pointer("/designModule/enrollmentInfo/count")
            .and_then(|v| v.as_u64().or_else(|| v.as_str()?.trim().parse().ok()));

        let collaborators = protocol
            .pointer("/sponsorCollaboratorsModule/collaborators")
            .and_then(Value::as_array)
            .map(|items| names(items, "/name"))
            .filter(|s| !s.is_empty());

        let primary_outcomes = protocol
            .pointer("/outcomesModule/primaryOutcomes")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|o| str_at(o, "/measure"))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|s| !s.is_empty());

        let eligibility = protocol.get("eligibilityModule").map(|e| Eligibility {
            sex: string_at(e, "/sex"),
            minimum_age: string_at(e, "/minimumAge"),
            maximum_age: string_at(e, "/maximumAge"),
            healthy_volunteers: e.get("healthyVolunteers").and_then(Value::as_bool),
        });

        Some(ClinicalTrial {
            url: format!("https://clinicaltrials.gov/study/{}", nct_id),
            title: string_at(protocol, "/identificationModule/briefTitle"),
            official_title: string_at(protocol, "/identificationModule/officialTitle"),
            organization: string_at(protocol, "/identificationModule/organization/fullName"),
            status: string_at(protocol, "/statusModule/overallStatus"),
            phases: join_list(protocol.pointer("/designModule/phases")),
            study_type: string_at(protocol, "/designModule/studyType"),
            start_date: str_at(protocol, "/statusModule/startDateStruct/date").map(normalize_date),
            completion_date: str_at(protocol, "/statusModule/completionDateStruct/date")
                .map(normalize_date),
            enrollment,
            enrollment_type: string_at(protocol, "/designModule/enrollmentInfo/type"),
            conditions: join_list(protocol.pointer("/conditionsModule/conditions")),
            intervention_drugs: drugs,
            intervention_biologicals: biologicals,
            intervention_others: others,
            lead_sponsor: string_at(protocol, "/sponsorCollaboratorsModule/leadSponsor/name"),
            collaborators,
            brief_summary: string_at(protocol, "/descriptionModule/briefSummary"),
            primary_outcomes,
            eligibility,
            has_results: study.get("hasResults").and_then(Value::as_bool),
            nct_id,
        })
    }

    /// Intervention names split into drugs, biologicals and everything else
    fn interventions(protocol: &Value) -> (Option<String>, Option<String>, Option<String>) {
        let mut drugs = Vec::new();
        let mut biologicals = Vec::new();
        let mut others = Vec::new();

        let items = protocol
            .pointer("/armsInterventionsModule/interventions")
            .and_then(Value::as_array);

        for item in items.into_iter().flatten() {
            let Some(name) = str_at(item, "/name") else {
                continue;
            };
            match str_at(item, "/type").unwrap_or_default() {
                "DRUG" => drugs.push(name),
                "BIOLOGICAL" => biologicals.push(name),
                _ => others.push(name),
            }
        }

        let join = |v: Vec<&str>| (!v.is_empty()).then(|| v.join(", "));
        (join(drugs), join(biologicals), join(others))
    }
}

fn names(items: &[Value], pointer: &str) -> String {
    items
        .iter()
        .filter_map(|i| str_at(i, pointer))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Default for ClinicalTrials {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for ClinicalTrials {
    fn id(&self) -> SourceId {
        SourceId::ClinicalTrials
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        Ok(ProviderRequest::get(format!("{}/studies", self.base_url))
            .param("query.term", query.text.trim())
            .param("pageSize", self.page_size.to_string())
            .param("format", "json"))
    }

    fn response(&self, _query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        response.error_for_status()?;

        let json: Value = response.json()?;
        let studies = json
            .get("studies")
            .and_then(Value::as_array)
            .map(|studies| {
                studies
                    .iter()
                    .filter_map(Self::parse_study)
                    .map(Record::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SourceStep::Done(studies))
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(n) = config.max_results {
            self.page_size = n.clamp(1, 1000);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}
