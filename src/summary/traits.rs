//! Summarizer trait

use crate::results::{AggregateResult, SummaryResult};
use crate::search::Query;
use async_trait::async_trait;

/// Turns a finished aggregate into a narrative summary.
///
/// Failures are reported inside the returned [`SummaryResult`]; they never
/// discard the aggregate they describe.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, query: &Query, aggregate: &AggregateResult) -> SummaryResult;
}
