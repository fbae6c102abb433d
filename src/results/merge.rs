//! Result merger

use super::types::{AggregateResult, SourceResult};
use std::collections::BTreeMap;

/// Fold per-source outcomes into one aggregate keyed by source id.
///
/// Error results are kept. Input order does not affect the output as long as
/// each source appears once; if a source appears more than once, an `ok`
/// result wins over an `error` one and the first of equal status is kept.
pub fn merge(results: impl IntoIterator<Item = SourceResult>) -> AggregateResult {
    let mut map: BTreeMap<_, SourceResult> = BTreeMap::new();

    for result in results {
        match map.get(&result.source_id) {
            Some(existing) if existing.is_ok() || !result.is_ok() => {}
            _ => {
                map.insert(result.source_id, result);
            }
        }
    }

    AggregateResult::from_map(map)
}
