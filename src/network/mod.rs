//! HTTP networking module
//!
//! Provides the shared HTTP client used by every provider adapter and by the
//! summarizer.

mod client;

pub use client::HttpClient;
