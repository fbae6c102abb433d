//! Application state shared across handlers

use super::limiter::{create_rate_limiter, AppRateLimiter};
use crate::cache::ResponseCache;
use crate::config::Settings;
use crate::network::HttpClient;
use crate::search::Search;
use crate::sources::SourceLoader;
use crate::summary::LlmSummarizer;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search executor
    pub search: Arc<Search>,
    /// Response cache, when enabled
    pub cache: Option<ResponseCache>,
    /// Inbound rate limiter, when enabled
    pub limiter: Option<AppRateLimiter>,
}

impl AppState {
    /// Create new application state: load sources and the summarizer
    pub fn new(settings: Settings, client: HttpClient) -> Self {
        let registry = Arc::new(SourceLoader::load(&settings, &client));

        let mut search = Search::new(registry)
            .with_timeout(settings.outgoing.default_timeout())
            .with_max_timeout(settings.outgoing.max_timeout());

        if !settings.llm.disabled {
            let summarizer = LlmSummarizer::new(client, settings.llm.clone());
            search = search.with_summarizer(Arc::new(summarizer));
        }

        Self::with_search(settings, search)
    }

    /// Create state around an already built executor
    pub fn with_search(settings: Settings, search: Search) -> Self {
        let cache = settings
            .cache
            .enabled
            .then(|| ResponseCache::new(settings.cache.ttl, settings.cache.max_capacity));
        let limiter = create_rate_limiter(&settings.limiter);

        Self {
            settings: Arc::new(settings),
            search: Arc::new(search),
            cache,
            limiter,
        }
    }
}
