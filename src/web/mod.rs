//! Web server module
//!
//! Provides the JSON API of med-aggregator.

mod handlers;
mod limiter;
mod routes;
mod state;

pub use handlers::{SearchRequest, SearchResponse, SummarizeData, SummarizeRequest};
pub use routes::create_router;
pub use state::AppState;
