//! Search orchestration module
//!
//! Fans a query out to the requested sources, merges their outcomes and
//! optionally summarizes the merged result.

mod executor;
mod models;

pub use executor::{Search, SearchOutcome, Stage};
pub use models::*;
