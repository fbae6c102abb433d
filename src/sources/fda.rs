//! openFDA drug label source

use super::normalize::{join_list, strip_heading};
use super::traits::*;
use crate::config::SourceConfig;
use crate::results::{DrugLabel, Record};
use crate::search::{Query, SearchType, SourceId};
use anyhow::Result;
use serde_json::Value;
use tracing::debug;

/// openFDA `/drug/label.json`
pub struct Fda {
    base_url: String,
    api_key: Option<String>,
    limit: u32,
}

impl Fda {
    pub fn new() -> Self {
        Self {
            base_url: "https://api.fda.gov".to_string(),
            api_key: None,
            limit: 10,
        }
    }

    /// openFDA search expression. `+` joins clauses with OR and must reach
    /// the server unescaped, so the expression is written into the URL
    /// directly instead of going through the query encoder.
    fn search_expression(query: &Query) -> String {
        let term = urlencoding::encode(&format!("\"{}\"", query.text.trim())).into_owned();
        match query.search_type {
            SearchType::Drug => format!(
                "openfda.brand_name:{term}+openfda.generic_name:{term}",
                term = term
            ),
            SearchType::Disease => format!("indications_and_usage:{}", term),
        }
    }

    fn parse_label(result: &Value) -> Option<DrugLabel> {
        let openfda = result.get("openfda");
        let field = |key: &str| join_list(openfda.and_then(|o| o.get(key)));

        let mut label = DrugLabel {
            brand_name: field("brand_name"),
            generic_name: field("generic_name"),
            manufacturer_name: field("manufacturer_name"),
            application_number: field("application_number"),
            substance_name: field("substance_name"),
            route: field("route"),
            product_type: field("product_type"),
            pharm_class_epc: field("pharm_class_epc"),
            pharm_class_moa: field("pharm_class_moa"),
            ..Default::default()
        };

        if label.brand_name.is_none() && label.generic_name.is_none() {
            return None;
        }

        let section = |key: &str, heading: &str| Self::section(result, key, heading);
        label.indications_and_usage = section("indications_and_usage", "INDICATIONS AND USAGE");
        label.mechanism_of_action = section("mechanism_of_action", "MECHANISM OF ACTION");
        label.description = section("description", "DESCRIPTION");
        label.dosage_and_administration =
            section("dosage_and_administration", "DOSAGE AND ADMINISTRATION");
        label.contraindications = section("contraindications", "CONTRAINDICATIONS");
        label.warnings = section("warnings", "WARNINGS");
        label.adverse_reactions = section("adverse_reactions", "ADVERSE REACTIONS");
        label.drug_interactions = section("drug_interactions", "DRUG INTERACTIONS");
        label.clinical_pharmacology = section("clinical_pharmacology", "CLINICAL PHARMACOLOGY");

        Some(label)
    }

    fn section(result: &Value, key: &str, heading: &str) -> Option<String> {
        let paragraphs: Vec<String> = result
            .get(key)?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .map(|p| strip_heading(p, heading))
            .filter(|p| !p.is_empty())
            .collect();
        (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
    }

    fn names_match(label: &DrugLabel, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        [&label.brand_name, &label.generic_name]
            .into_iter()
            .flatten()
            .any(|name| name.to_lowercase().contains(&needle))
    }
}

impl Default for Fda {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Fda {
    fn id(&self) -> SourceId {
        SourceId::Fda
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        let url = format!(
            "{}/drug/label.json?search={}",
            self.base_url,
            Self::search_expression(query)
        );

        Ok(ProviderRequest::get(url)
            .param("limit", self.limit.to_string())
            .param_opt("api_key", self.api_key.as_deref()))
    }

    fn response(&self, query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        // openFDA answers 404 when nothing matches
        if response.status == 404 {
            debug!("openFDA has no labels for {:?}", query.text);
            return Ok(SourceStep::Done(Vec::new()));
        }
        response.error_for_status()?;

        let json: Value = response.json()?;
        let labels = json
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(Self::parse_label)
                    .filter(|label| {
                        query.search_type == SearchType::Disease
                            || Self::names_match(label, &query.text)
                    })
                    .map(Record::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SourceStep::Done(labels))
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ref key) = config.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(n) = config.max_results {
            self.limit = n.clamp(1, 100);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}
