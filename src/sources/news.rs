//! News search through the Serper API

use super::normalize::{normalize_date, relative_date, str_at, string_at};
use super::traits::*;
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::results::{NewsArticle, NewsCategory, Record};
use crate::search::{Query, SearchType, SourceId};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

const REGULATORY_KEYWORDS: &[&str] = &[
    "fda", "ema", "approval", "regulation", "patent", "clinical trial", "phase", "regulatory",
    "safety", "recall", "warning", "compliance", "guidance", "legal", "lawsuit", "settlement",
    "legislation", "law", "investigation", "inspection", "license", "clearance", "authorized",
    "rejected", "delay", "advisory committee", "protocol", "guideline",
];

const COMMERCIAL_KEYWORDS: &[&str] = &[
    "market", "sales", "revenue", "profit", "launch", "commercial", "distribution",
    "partnership", "deal", "agreement", "acquisition", "merger", "investment", "stock", "shares",
    "financial", "price", "cost", "reimbursement", "insurance", "discount", "wholesale", "retail",
    "prescriptions", "marketing", "advertising", "promotion", "competition", "competitor",
    "market share", "growth", "forecast",
];

const CLINICAL_KEYWORDS: &[&str] = &[
    "clinical", "trial", "study", "research", "patient", "treatment", "efficacy", "outcome",
    "endpoint", "data", "results", "adverse", "effect", "response", "therapy", "therapeutic",
    "dosage", "dose", "regimen", "indication", "contraindication", "protocol", "cohort",
    "placebo", "randomized", "blind", "publication", "journal", "paper", "conference",
    "presentation", "abstract", "poster", "scientific",
];

/// Serper `/news`
pub struct News {
    base_url: String,
    api_key: Option<String>,
    num: u32,
}

impl News {
    pub fn new() -> Self {
        Self {
            base_url: "https://google.serper.dev".to_string(),
            api_key: None,
            num: 10,
        }
    }

    fn search_text(query: &Query) -> String {
        let text = query.text.trim();
        match query.search_type {
            SearchType::Drug => format!("{} drug", text),
            SearchType::Disease => format!("{} treatment", text),
        }
    }

    fn parse_article(item: &Value, position: u32, today: NaiveDate) -> Option<NewsArticle> {
        let title = string_at(item, "/title")?;
        let link = string_at(item, "/link")?;
        let snippet = string_at(item, "/snippet");
        let category = classify(&title, snippet.as_deref().unwrap_or_default());

        let date = str_at(item, "/date").map(|raw| match relative_date(raw, today) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => normalize_date(raw),
        });

        Some(NewsArticle {
            title,
            link,
            snippet,
            source: string_at(item, "/source"),
            date,
            thumbnail: string_at(item, "/imageUrl"),
            category,
            position,
        })
    }

    fn parse_news(json: &Value, today: NaiveDate) -> Vec<Record> {
        json.get("news")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let position = item
                            .get("position")
                            .and_then(Value::as_u64)
                            .unwrap_or_default() as u32;
                        Self::parse_article(item, position, today)
                    })
                    .map(Record::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Keyword-score an article; ties go regulatory, then commercial, then clinical
pub fn classify(title: &str, snippet: &str) -> NewsCategory {
    let text = format!("{} {}", title, snippet).to_lowercase();
    let score = |keywords: &[&str]| keywords.iter().filter(|kw| text.contains(*kw)).count();

    let regulatory = score(REGULATORY_KEYWORDS);
    let commercial = score(COMMERCIAL_KEYWORDS);
    let clinical = score(CLINICAL_KEYWORDS);
    let best = regulatory.max(commercial).max(clinical);

    if best == 0 {
        NewsCategory::Other
    } else if regulatory == best {
        NewsCategory::Regulatory
    } else if commercial == best {
        NewsCategory::Commercial
    } else {
        NewsCategory::Clinical
    }
}

impl Default for News {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for News {
    fn id(&self) -> SourceId {
        SourceId::News
    }

    fn about(&self) -> SourceAbout {
        SourceAbout::new().api_key_required(true)
    }

    fn timeout(&self) -> f64 {
        10.0
    }

    fn request(&self, query: &Query) -> Result<ProviderRequest> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::Config("news API key is not configured".into()))?;

        Ok(ProviderRequest::post(format!("{}/news", self.base_url))
            .header("X-API-KEY", api_key)
            .header("Content-Type", "application/json")
            .json(json!({
                "q": Self::search_text(query),
                "num": self.num,
                "gl": "us",
                "hl": "en",
            })))
    }

    fn response(&self, _query: &Query, response: ProviderResponse) -> Result<SourceStep> {
        response.error_for_status()?;
        let json: Value = response.json()?;
        Ok(SourceStep::Done(Self::parse_news(&json, Utc::now().date_naive())))
    }

    fn init(&mut self, config: &SourceConfig) -> Result<()> {
        if let Some(ref url) = config.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self.api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if let Some(n) = config.max_results {
            self.num = n.clamp(1, 100);
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

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("FDA issues recall of tablets", "Safety warning for patients"),
            NewsCategory::Regulatory
        );
        assert_eq!(
            classify("Quarterly revenue beats forecast", "Sales growth in retail"),
            NewsCategory::Commercial
        );
        assert_eq!(
            classify("Randomized placebo cohort", "Efficacy endpoint met"),
            NewsCategory::Clinical
        );
        assert_eq!(classify("Weather tomorrow", "Sunny"), NewsCategory::Other);
    }

    #[test]
    fn test_missing_key_fails_request() {
        let news = News::new();
        let err = news
            .request(&Query::new("aspirin", SearchType::Drug))
            .unwrap_err();
        assert!(matches!(
            SourceError::classify(&err),
            SourceError::Config(_)
        ));
    }

    #[test]
    fn test_request() {
        let mut news = News::new();
        let mut config = SourceConfig::new(SourceId::News);
        config.api_key = Some("serper-key".into());
        news.init(&config).unwrap();

        let request = news
            .request(&Query::new("asthma", SearchType::Disease))
            .unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://google.serper.dev/news");
        assert_eq!(
            request.headers.get("X-API-KEY").map(String::as_str),
            Some("serper-key")
        );
        assert_eq!(request.body.as_ref().unwrap()["q"], "asthma treatment");
    }

    #[test]
    fn test_parse_news() {
        let body = json!({
            "news": [
                {
                    "title": "FDA approves new aspirin formulation",
                    "link": "https://news.example.com/a",
                    "snippet": "Regulatory approval granted",
                    "source": "Example News",
                    "date": "3 days ago",
                    "imageUrl": "https://news.example.com/a.jpg",
                    "position": 1
                },
                {
                    "title": "Aspirin sales climb",
                    "link": "https://news.example.com/b",
                    "date": "Mar 1, 2024",
                    "position": 2
                },
                {"title": "No link"}
            ]
        });
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let records = News::parse_news(&body, today);
        assert_eq!(records.len(), 2);

        let Record::News(first) = &records[0] else {
            panic!("expected an article");
        };
        assert_eq!(first.date.as_deref(), Some("2024-03-12"));
        assert_eq!(first.category, NewsCategory::Regulatory);
        assert_eq!(first.thumbnail.as_deref(), Some("https://news.example.com/a.jpg"));
        assert_eq!(first.position, 1);

        let Record::News(second) = &records[1] else {
            panic!("expected an article");
        };
        assert_eq!(second.date.as_deref(), Some("2024-03-01"));
        assert_eq!(second.category, NewsCategory::Commercial);
    }
}
