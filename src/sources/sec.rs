//! SEC EDGAR full-text search

use super::normalize::{normalize_date, str_at, string_at};
use super::traits::*;
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::results::{Record, SecFiling};
use crate::search::{Query, SourceId};
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// "PFIZER INC  (PFE)  (CIK 0000078003)"; the ticker group is optional
static DISPLAY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+?)\s*(?:\((?P<ticker>[^)]*)\))?\s*\(CIK\s+(?P<cik>\d+)\)\s*$")
        .expect("valid regex")
});

const FORMS: &str = "10-K,10-Q,8-K";

/// EDGAR full-text search (`efts.sec.gov`)
pub struct Sec {
    base_url: String,
    user_agent: Option<String>,
    max_results: usize,
}

impl Sec {
    pub fn new() -> Self {
        Self {
            base_url: "https://efts.sec.gov/LATEST".to_string(),
            user_agent: None,
            max_results: 10,
        }
    }

    fn parse_hit(hit: &Value) -> Option<SecFiling> {
        let source = hit.get("_source")?;
        let form = string_at(source, "/form")
            .or_else(|| string_at(source, "/file_type"))?;

        let display = source
            .get("display_names")
            .and_then(Value::as_array)
            .and_then(|names| names.first())
            .and_then(Value::as_str)
            .unwrap_or_default();
        let (company, ticker, display_cik) = split_display_name(display);

        let cik = source
            .get("ciks")
            .and_then(Value::as_array)
            .and_then(|ciks| ciks.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(display_cik);

        let accession = string_at(source, "/adsh");
        let url = Self::document_url(cik.as_deref(), accession.as_deref(), str_at(hit, "/_id"));

        Some(SecFiling {
            company: company.unwrap_or_default(),
            ticker,
            cik,
            form,
            filed: str_at(source, "/file_date").map(normalize_date),
            period_ending: str_at(source, "/period_ending").map(normalize_date),
            accession_number: accession,
            url,
        })
    }

    /// Archive URL of the matched document. `_id` is "<adsh>:<filename>".
    fn document_url(cik: Option<&str>, adsh: Option<&str>, id: Option<&str>) -> Option<String> {
        let cik = cik?.trim_start_matches('0');
        let adsh = adsh?.replace('-', "");
        let filename = id?.split_once(':')?.1;
        if cik.is_empty() || filename.is_empty() {
            return None;
        }
        Some(format!(
            "https://www.sec.gov/Archives/edgar/data/{}/{}/{}",
            cik, adsh, filename
        ))
    }
}

/// Company name, ticker and CIK from an EDGAR display name
fn split_display_name(display: &str) -> (Option<String>, Option<String>, Option<String>) {
    match DISPLAY_NAME.captures(display) {
        Some(caps) => (
            caps.name("name").map(|m| m.as_str().trim().to_string()),
            caps.name("ticker")
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty()),
            caps.name("cik").map(|m| m.as_str().to_string()),
        ),
        None => {
            let name = display.trim();
            ((!name.is_empty()).then(|| name.to_string()), None, None)
        }
    }
}

impl Default for Sec {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Sec {
    fn id(&self) -> SourceId {
        SourceId::Sec
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        let user_agent = self.user_agent.as_deref().ok_or_else(|| {
            SourceError::Config("SEC requires a contact user agent (SEC_USER_AGENT)".into())
        })?;

        Ok(ProviderRequest::get(format!("{}/search-index", self.base_url))
            .header("User-Agent", user_agent)
            .param("q", format!("\"{}\"", query.text.trim()))
            .param("forms", FORMS))
    }

    fn response(&self, _query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        response.error_for_status()?;
        let json: Value = response.json()?;

        let hits = json
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // One filing can match through several of its documents
        let mut seen = HashSet::new();
        let filings = hits
            .iter()
            .filter_map(Self::parse_hit)
            .filter(|f| match f.accession_number {
                Some(ref adsh) => seen.insert(adsh.clone()),
                None => true,
            })
            .take(self.max_results)
            .map(Record::from)
            .collect();

        Ok(SourceStep::Done(filings))
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self.user_agent = config
            .extra_str("user_agent")
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .map(str::to_string);
        if let Some(n) = config.max_results {
            self.max_results = n.clamp(1, 100) as usize;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchType;
    use serde_json::json;

    #[test]
    fn test_split_display_name() {
        assert_eq!(
            split_display_name("PFIZER INC  (PFE)  (CIK 0000078003)"),
            (
                Some("PFIZER INC".to_string()),
                Some("PFE".to_string()),
                Some("0000078003".to_string())
            )
        );
        assert_eq!(
            split_display_name("Acme Bio Holdings  (CIK 0001234567)"),
            (
                Some("Acme Bio Holdings".to_string()),
                None,
                Some("0001234567".to_string())
            )
        );
        assert_eq!(
            split_display_name("Loose Name"),
            (Some("Loose Name".to_string()), None, None)
        );
    }

    #[test]
    fn test_request_requires_user_agent() {
        let mut sec = Sec::new();
        assert!(sec.request(&Query::new("aspirin", SearchType::Drug)).is_err());

        let mut config = SourceConfig::new(SourceId::Sec);
        config.set_extra("user_agent", "Acme ops@acme.test");
        sec.init(&config).unwrap();

        let request = sec.request(&Query::new("aspirin", SearchType::Drug)).unwrap();
        assert_eq!(request.url, "https://efts.sec.gov/LATEST/search-index");
        assert_eq!(request.params.get("q").map(String::as_str), Some("\"aspirin\""));
        assert_eq!(request.params.get("forms").map(String::as_str), Some(FORMS));
        assert_eq!(
            request.headers.get("User-Agent").map(String::as_str),
            Some("Acme ops@acme.test")
        );
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({
            "hits": {
                "total": {"value": 3},
                "hits": [
                    {
                        "_id": "0000078003-24-000012:pfe-20231231.htm",
                        "_source": {
                            "ciks": ["0000078003"],
                            "display_names": ["PFIZER INC  (PFE)  (CIK 0000078003)"],
                            "form": "10-K",
                            "file_date": "2024-02-22",
                            "period_ending": "2023-12-31",
                            "adsh": "0000078003-24-000012"
                        }
                    },
                    {
                        "_id": "0000078003-24-000012:ex21.htm",
                        "_source": {
                            "ciks": ["0000078003"],
                            "display_names": ["PFIZER INC  (PFE)  (CIK 0000078003)"],
                            "form": "10-K",
                            "adsh": "0000078003-24-000012"
                        }
                    },
                    {"_id": "broken", "_source": {}}
                ]
            }
        });
        let response = ProviderResponse {
            status: 200,
            text: body.to_string(),
            url: String::new(),
        };

        let step = Sec::new()
            .response(&Query::new("aspirin", SearchType::Drug), response)
            .unwrap();
        let SourceStep::Done(records) = step else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);

        let Record::SecFiling(filing) = &records[0] else {
            panic!("expected a filing");
        };
        assert_eq!(filing.company, "PFIZER INC");
        assert_eq!(filing.ticker.as_deref(), Some("PFE"));
        assert_eq!(filing.form, "10-K");
        assert_eq!(filing.filed.as_deref(), Some("2024-02-22"));
        assert_eq!(
            filing.url.as_deref(),
            Some("https://www.sec.gov/Archives/edgar/data/78003/000007800324000012/pfe-20231231.htm")
        );
    }
}
