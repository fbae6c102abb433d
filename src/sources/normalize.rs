//! Helpers shared by the provider parsers

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Section numbering in front of label headings, e.g. "1 " or "5.1 "
static SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+(?:\.\d+)*\s+").expect("valid regex"));

/// "3 days ago", "1 hour ago"
static RELATIVE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s+(minute|min|hour|day|week|month)s?\s+ago\s*$")
        .expect("valid regex")
});

/// Non-empty trimmed string at a JSON path
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Owned variant of [`str_at`]
pub fn string_at(value: &Value, pointer: &str) -> Option<String> {
    str_at(value, pointer).map(str::to_string)
}

/// Join a string or an array of strings with ", "
pub fn join_list(value: Option<&Value>) -> Option<String> {
    let joined = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!joined.is_empty()).then_some(joined)
}

/// Remove a leading section heading such as "1 INDICATIONS AND USAGE:"
pub fn strip_heading(text: &str, heading: &str) -> String {
    let text = SECTION_NUMBER.replace(text, "");
    let text = text.trim_start();

    let matches_heading = text
        .get(..heading.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(heading))
        .unwrap_or(false);

    if matches_heading {
        text[heading.len()..]
            .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .to_string()
    } else {
        text.to_string()
    }
}

/// Normalize a provider date to `YYYY-MM-DD` or `YYYY-MM`.
/// Unrecognized input is returned trimmed and otherwise untouched.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y %b %d", "%b %d, %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    // Month precision: pad a day and parse
    let month_candidates = [
        (format!("{}-01", raw), "%Y-%m-%d"),
        (format!("{}/01", raw), "%Y/%m/%d"),
        (format!("{} 01", raw), "%Y %b %d"),
        (format!("01 {}", raw), "%d %B %Y"),
    ];
    for (padded, fmt) in &month_candidates {
        if let Ok(date) = NaiveDate::parse_from_str(padded, fmt) {
            return date.format("%Y-%m").to_string();
        }
    }

    // PubMed sometimes appends a season or range: "2024 Jan-Feb"
    if let Some((head, _)) = raw.split_once('-') {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{} 01", head), "%Y %b %d") {
            return date.format("%Y-%m").to_string();
        }
    }

    raw.to_string()
}

/// Resolve "N units ago" against `today`
pub fn relative_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = RELATIVE_DATE.captures(raw)?;
    let n: i64 = caps[1].parse().ok()?;

    let delta = match caps[2].to_ascii_lowercase().as_str() {
        "minute" | "min" => Duration::minutes(n),
        "hour" => Duration::hours(n),
        "day" => Duration::days(n),
        "week" => Duration::weeks(n),
        "month" => Duration::days(30 * n),
        _ => return None,
    };

    // Sub-day offsets round to the day they land on
    let start = today.and_hms_opt(12, 0, 0)?;
    Some((start - delta).date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_list() {
        assert_eq!(
            join_list(Some(&json!(["ORAL", " TOPICAL ", ""]))),
            Some("ORAL, TOPICAL".to_string())
        );
        assert_eq!(join_list(Some(&json!("ORAL"))), Some("ORAL".to_string()));
        assert_eq!(join_list(Some(&json!([]))), None);
        assert_eq!(join_list(Some(&json!(3))), None);
        assert_eq!(join_list(None), None);
    }

    #[test]
    fn test_str_at() {
        let value = json!({"a": {"b": "  x  ", "c": ""}});
        assert_eq!(str_at(&value, "/a/b"), Some("x"));
        assert_eq!(str_at(&value, "/a/c"), None);
        assert_eq!(str_at(&value, "/a/missing"), None);
    }

    #[test]
    fn test_strip_heading() {
        assert_eq!(
            strip_heading("INDICATIONS AND USAGE: Relief of pain.", "INDICATIONS AND USAGE"),
            "Relief of pain."
        );
        assert_eq!(
            strip_heading("1 INDICATIONS AND USAGE Relief of pain.", "INDICATIONS AND USAGE"),
            "Relief of pain."
        );
        assert_eq!(
            strip_heading("Relief of pain.", "INDICATIONS AND USAGE"),
            "Relief of pain."
        );
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-03-15"), "2024-03-15");
        assert_eq!(normalize_date("20240315"), "2024-03-15");
        assert_eq!(normalize_date("2024/03/15"), "2024-03-15");
        assert_eq!(normalize_date("2024 Mar 15"), "2024-03-15");
        assert_eq!(normalize_date("Mar 15, 2024"), "2024-03-15");
        assert_eq!(normalize_date("2024-03"), "2024-03");
        assert_eq!(normalize_date("2024 Mar"), "2024-03");
        assert_eq!(normalize_date("2024 Jan-Feb"), "2024-01");
        assert_eq!(normalize_date("2024"), "2024");
        assert_eq!(normalize_date(" soon "), "soon");
    }

    #[test]
    fn test_relative_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            relative_date("3 days ago", today),
            NaiveDate::from_ymd_opt(2024, 3, 12)
        );
        assert_eq!(
            relative_date("1 week ago", today),
            NaiveDate::from_ymd_opt(2024, 3, 8)
        );
        assert_eq!(relative_date("5 hours ago", today), Some(today));
        assert_eq!(relative_date("yesterday", today), None);
    }
}
