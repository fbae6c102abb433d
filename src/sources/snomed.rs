//! SNOMED CT concept search through a Snowstorm terminology server

use super::normalize::{str_at, string_at};
use super::traits::*;
use crate::config::SourceConfig;
use crate::results::{Record, SnomedConcept};
use crate::search::{Query, SourceId};
use anyhow::Result;
use serde_json::Value;

const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

/// Snowstorm browser concept search
pub struct Snomed {
    base_url: String,
    edition: String,
    version: Option<String>,
    limit: u32,
}

impl Snomed {
    pub fn new() -> Self {
        Self {
            base_url: "https://snowstorm.ihtsdotools.org/snowstorm/snomed-ct".to_string(),
            edition: "MAIN".to_string(),
            version: None,
            limit: 20,
        }
    }

    fn concepts_url(&self) -> String {
        match self.version {
            Some(ref version) => format!(
                "{}/browser/{}/{}/concepts",
                self.base_url, self.edition, version
            ),
            None => format!("{}/browser/{}/concepts", self.base_url, self.edition),
        }
    }

    fn parse_concept(item: &Value) -> Option<SnomedConcept> {
        let code = string_at(item, "/conceptId")?;
        let full_name = string_at(item, "/fsn/term");
        let display = string_at(item, "/pt/term").or_else(|| full_name.clone())?;

        // Either a bare enum name or a {"term": ...} object depending on version
        let definition_status = str_at(item, "/definitionStatus")
            .or_else(|| str_at(item, "/definitionStatus/term"))
            .map(str::to_string);

        Some(SnomedConcept {
            code,
            display,
            semantic_tag: full_name.as_deref().and_then(semantic_tag),
            full_name,
            definition_status,
            module: string_at(item, "/moduleId"),
            active: item.get("active").and_then(Value::as_bool).unwrap_or(true),
            system: SNOMED_SYSTEM.to_string(),
        })
    }
}

/// "Aspirin (substance)" -> "substance"
pub fn semantic_tag(full_name: &str) -> Option<String> {
    let trimmed = full_name.trim_end();
    let inner = trimmed.strip_suffix(')')?;
    let start = inner.rfind('(')?;
    let tag = inner[start + 1..].trim();
    (!tag.is_empty()).then(|| tag.to_string())
}

impl Default for Snomed {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Snomed {
    fn id(&self) -> SourceId {
        SourceId::Snomed
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        Ok(ProviderRequest::get(self.concepts_url())
            .header("Accept-Language", "en")
            .param("term", query.text.trim())
            .param("activeFilter", "true")
            .param("offset", "0")
            .param("limit", self.limit.to_string()))
    }

    fn response(&self, _query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        response.error_for_status()?;
        let json: Value = response.json()?;

        let concepts = json
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Self::parse_concept)
                    .map(Record::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SourceStep::Done(concepts))
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(edition) = config.extra_str("edition") {
            self.edition = edition.trim_matches('/').to_string();
        }
        if let Some(version) = config.extra_str("version") {
            self.version = Some(version.trim_matches('/').to_string());
        }
        if let Some(n) = config.max_results {
            self.limit = n.clamp(1, 200);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if self.edition.is_empty() {
            return Err(anyhow::anyhow!("SNOMED edition must not be empty"));
        }
        Ok(())
    }
}
