//! Provider sources
//!
//! Defines the Adapter trait the orchestrator fans out over, the HTTP
//! Source trait each provider implements, and a registry for the loaded set.

mod http_adapter;
mod loader;
mod normalize;
mod registry;
mod traits;

// Provider implementations
pub mod clinical_trials;
pub mod fda;
pub mod ncbi;
pub mod news;
pub mod sec;
pub mod snomed;

pub use http_adapter::HttpAdapter;
pub use loader::SourceLoader;
pub use registry::SourceRegistry;
pub use traits::*;
