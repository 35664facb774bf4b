//! Competitor trend pipeline for trendbrief.
//!
//! Turns a (brand, product) pair — or a free-text query — into a refined,
//! structured competitor brief: fetch web evidence via a search provider,
//! synthesize per-competitor summaries with a language model, rewrite each
//! summary in an editorial pass, and assemble the terminal [`TrendReport`].
//! Provider handles are injected as trait objects so tests can substitute
//! fakes for the network clients.

pub mod error;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod search;
pub mod stages;
pub mod types;

mod prompts;

pub use error::AgentError;
pub use llm::{LanguageModel, SonarClient};
pub use pipeline::TrendPipeline;
pub use render::{default_subject, format_email_body};
pub use search::{SearchProvider, SearchResult, TavilyClient};
pub use types::{CompetitorRecord, PipelineState, TrendReport, ENGAGEMENT_NOT_SPECIFIED};
