//! Response caching for search requests
//!
//! Only complete answers are kept: every source succeeded and the summary,
//! when one was requested, is not an error.

use crate::search::{Query, SearchOutcome};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cache of search outcomes keyed by [`query_cache_key`]
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, Arc<SearchOutcome>>,
}

impl ResponseCache {
    /// Create a new response cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached outcome
    pub async fn get(&self, key: &str) -> Option<Arc<SearchOutcome>> {
        self.cache.get(key).await
    }

    /// Store an outcome if it is complete. Returns whether it was stored.
    pub async fn store(&self, key: String, outcome: &SearchOutcome) -> bool {
        if !is_cacheable(outcome) {
            return false;
        }
        self.cache.insert(key, Arc::new(outcome.clone())).await;
        true
    }
}

fn is_cacheable(outcome: &SearchOutcome) -> bool {
    !outcome.results.is_empty()
        && outcome.results.all_ok()
        && !outcome.summary.as_ref().map_or(false, |s| s.is_error())
}

/// Generate a cache key for a search request
pub fn query_cache_key(query: &Query, summarize: bool) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(query.text.trim().to_lowercase().as_bytes());
    hasher.update([0]);
    hasher.update(query.search_type.as_str().as_bytes());
    // BTreeSet iteration is sorted, so source order never changes the key
    for source in &query.sources {
        hasher.update([0]);
        hasher.update(source.as_str().as_bytes());
    }
    hasher.update([0, summarize as u8]);

    format!("{:x}", hasher.finalize())
}
