//! Summarization of aggregated results by a hosted language model

mod llm;
mod prompt;
mod traits;

pub use llm::LlmSummarizer;
pub use traits::Summarizer;
