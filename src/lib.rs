//! med-aggregator: drug and disease search across public medical data APIs
//!
//! A query fans out to the FDA, ClinicalTrials.gov, PubMed, news search,
//! SEC EDGAR and SNOMED CT, every provider response is normalized into a
//! typed record set, and a hosted language model summarizes the merged result.

pub mod cache;
pub mod config;
pub mod error;
pub mod network;
pub mod results;
pub mod search;
pub mod sources;
pub mod summary;
pub mod web;

pub use config::Settings;
pub use results::{AggregateResult, SourceResult, SummaryResult};
pub use search::{Query, Search, SearchType, SourceId};
pub use sources::Adapter;
pub use summary::Summarizer;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for a single provider call in seconds
pub const DEFAULT_TIMEOUT: u64 = 20;

/// Maximum timeout that can be set for a provider call
pub const MAX_TIMEOUT: u64 = 30;
