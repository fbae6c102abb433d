//! Prompt construction for the summarizer

use crate::results::AggregateResult;
use crate::search::{Query, SearchType};
use serde_json::{json, Map, Value};

pub const SYSTEM_PROMPT: &str = "You are a medical research analyst. Write clear, factual \
summaries for healthcare professionals using only the data provided. When a source is marked \
unavailable, say that its data could not be retrieved instead of guessing.";

fn instructions(query: &Query) -> String {
    let name = query.text.trim();
    match query.search_type {
        SearchType::Drug => format!(
            "Please analyze the following information about the drug {name} and provide:\n\
             1. A concise summary of the drug's indications and mechanism of action (2-3 sentences)\n\
             2. Key clinical information including common dosage forms and administration routes\n\
             3. Notable regulatory information (approval status, recent regulatory changes)\n\
             4. Important safety considerations including major adverse effects and contraindications\n\
             5. A brief overview of recent research, clinical trials, news and company filings",
            name = name
        ),
        SearchType::Disease => format!(
            "Please analyze the following information about {name} and provide:\n\
             1. A concise overview of the disease including definition, prevalence, and key characteristics (2-3 sentences)\n\
             2. Main symptoms and clinical presentation\n\
             3. Current treatment approaches and standard of care, including FDA approved treatments\n\
             4. Recent research developments or clinical trials\n\
             5. Major unmet needs and future directions for treatment",
            name = name
        ),
    }
}

/// Per-source context: truncated items for successful sources, an
/// unavailability note for failed ones
pub fn context(aggregate: &AggregateResult, max_items: usize) -> Value {
    let mut sources = Map::new();
    for (id, result) in aggregate.iter() {
        let entry = if result.is_ok() {
            let items: Vec<&_> = result.items.iter().take(max_items).collect();
            json!({
                "source": id.label(),
                "total_items": result.items.len(),
                "items": items,
            })
        } else {
            json!({
                "source": id.label(),
                "status": "unavailable",
                "reason": result.error_message.as_deref().unwrap_or("unknown error"),
            })
        };
        sources.insert(id.to_string(), entry);
    }
    Value::Object(sources)
}

/// User message: instructions followed by the serialized data
pub fn user_prompt(
    query: &Query,
    aggregate: &AggregateResult,
    max_items: usize,
    max_chars: usize,
) -> String {
    let data = context(aggregate, max_items).to_string();
    format!(
        "{}\n\nHere's the information I have about {}:\n{}",
        instructions(query),
        query.text.trim(),
        truncate_chars(&data, max_chars)
    )
}

/// Cut at a char boundary, marking the cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...[truncated]", &text[..idx]),
        None => text.to_string(),
    }
}
