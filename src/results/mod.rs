//! Result types, normalized records and the result merger
//!
//! Adapters produce [`SourceResult`]s, the merger folds them into one
//! [`AggregateResult`] per query.

mod merge;
mod records;
mod types;

pub use merge::merge;
pub use records::*;
pub use types::*;
