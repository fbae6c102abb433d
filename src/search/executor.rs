//! Fan-out execution and orchestration

use super::models::{Query, SourceId};
use crate::error::SourceError;
use crate::results::{merge, AggregateResult, SourceResult, SummaryResult};
use crate::sources::SourceRegistry;
use crate::summary::Summarizer;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Lifecycle of one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Fetching,
    Merged,
    Summarizing,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Fetching => "fetching",
            Self::Merged => "merged",
            Self::Summarizing => "summarizing",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Aggregate plus the optional summary of it
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: AggregateResult,
    pub summary: Option<SummaryResult>,
}

/// Search executor that fans a query out to every requested source
pub struct Search {
    /// Loaded adapters
    registry: Arc<SourceRegistry>,
    /// Optional summarization stage
    summarizer: Option<Arc<dyn Summarizer>>,
    /// Default timeout
    default_timeout: Duration,
    /// Maximum timeout
    max_timeout: Duration,
}

impl Search {
    /// Create a new search executor
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            summarizer: None,
            default_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT),
            max_timeout: Duration::from_secs(crate::MAX_TIMEOUT),
        }
    }

    /// Attach a summarizer
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Set default timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set maximum timeout
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn summarizer(&self) -> Option<&Arc<dyn Summarizer>> {
        self.summarizer.as_ref()
    }

    /// Query every requested source concurrently and merge the outcomes.
    ///
    /// Every requested source gets exactly one entry, whatever happened to
    /// its call. Dropping the returned future cancels all in-flight calls.
    pub async fn run(&self, query: &Query) -> AggregateResult {
        let futures: Vec<_> = query
            .sources
            .iter()
            .map(|&id| self.fetch_source(id, query))
            .collect();

        info!(
            "Searching '{}' ({}) on {} sources",
            query.text,
            query.search_type,
            futures.len()
        );

        // Wait for all sources to settle
        let results = join_all(futures).await;
        merge(results)
    }

    /// Run the fan-out, then summarize when asked to and there is
    /// something to summarize
    pub async fn execute(&self, query: &Query, summarize: bool) -> SearchOutcome {
        let start = Instant::now();
        self.stage(query, Stage::Received);

        self.stage(query, Stage::Fetching);
        let results = self.run(query).await;
        self.stage(query, Stage::Merged);

        let summary = match self.summarizer {
            Some(ref summarizer) if summarize && !results.is_empty() => {
                self.stage(query, Stage::Summarizing);
                Some(summarizer.summarize(query, &results).await)
            }
            _ => None,
        };

        self.stage(query, Stage::Completed);
        info!(
            "Search '{}' completed in {:?}: {} sources, {} failed",
            query.text,
            start.elapsed(),
            results.len(),
            results.error_count()
        );

        SearchOutcome { results, summary }
    }

    fn stage(&self, query: &Query, stage: Stage) {
        debug!("query '{}' {}", query.text, stage);
    }

    /// Effective timeout for a source
    fn source_timeout(&self, id: SourceId) -> Duration {
        let secs = self
            .registry
            .get_timeout(id, self.default_timeout.as_secs_f64())
            .min(self.max_timeout.as_secs_f64())
            .max(0.0);
        Duration::from_secs_f64(secs)
    }

    /// Call a single source, isolating its failures
    async fn fetch_source(&self, id: SourceId, query: &Query) -> SourceResult {
        let Some(adapter) = self.registry.get(id).cloned() else {
            warn!("Source {} requested but not available", id);
            return SourceResult::from_error(id, &SourceError::Unavailable);
        };

        let limit = self.source_timeout(id);
        let start = Instant::now();
        debug!("Fetching {} with timeout {:?}", id, limit);

        let call = AssertUnwindSafe(adapter.fetch(query)).catch_unwind();
        let mut result = match timeout(limit, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                error!("Source {} panicked: {}", id, message);
                SourceResult::from_error(id, &SourceError::Panicked(message))
            }
            Err(_) => {
                warn!("Timeout for source {} after {:?}", id, limit);
                SourceResult::from_error(id, &SourceError::Timeout)
            }
        };

        // The aggregate is keyed by what was requested
        result.source_id = id;

        debug!(
            "Source {} finished in {:?}: {} items{}",
            id,
            start.elapsed(),
            result.items.len(),
            result
                .error_message
                .as_deref()
                .map(|e| format!(", error: {}", e))
                .unwrap_or_default()
        );
        result
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchType;

    #[tokio::test]
    async fn test_empty_registry_reports_unavailable() {
        let search = Search::new(Arc::new(SourceRegistry::new()));
        let query = Query::new("aspirin", SearchType::Drug).with_sources([SourceId::Fda]);

        let outcome = search.execute(&query, true).await;
        let fda = outcome.results.get(SourceId::Fda).unwrap();

        assert!(!fda.is_ok());
        assert_eq!(fda.error_message.as_deref(), Some("source not available"));
        assert!(outcome.summary.is_none());
    }

    #[tokio::test]
    async fn test_no_sources_no_results() {
        let search = Search::new(Arc::new(SourceRegistry::new()));
        let query = Query::new("aspirin", SearchType::Drug).with_sources(Vec::new());

        let results = search.run(&query).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
