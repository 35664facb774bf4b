use serde::{Deserialize, Serialize};

/// Sentinel for "value intentionally absent", distinct from an empty string.
///
/// Records whose engagement is missing or all-whitespace are rewritten to
/// this value during synthesis, so downstream consumers never see a blank.
pub const ENGAGEMENT_NOT_SPECIFIED: &str = "Not specified";

/// One competitor's summarized activity.
///
/// `heading` is the competitor/brand name and identifies the record within a
/// single pipeline run. Headings are not unique across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorRecord {
    pub heading: String,
    pub summary: String,
    pub engagement: String,
}

/// Terminal output of a pipeline run: the refined records, in synthesis order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub summaries: Vec<CompetitorRecord>,
}

/// Mutable state threaded through the pipeline stages.
///
/// Each stage reads only fields produced by earlier stages and writes its own
/// designated field; no field is mutated retroactively by a later stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Raw user query, set only on the free-text entry point.
    pub query: Option<String>,
    /// Subject brand (intent extraction or caller-supplied).
    pub brand: Option<String>,
    /// Product category (intent extraction or caller-supplied).
    pub product: Option<String>,
    /// Product type, when intent extraction recognises one.
    pub category: Option<String>,
    /// Merged, deduplicated evidence text from the fetch stage.
    pub evidence: Option<String>,
    /// Structured synthesis output, pre-refinement.
    pub synthesis: Option<Vec<CompetitorRecord>>,
    /// Refined records, same order and (heading, engagement) as synthesis.
    pub refined: Option<Vec<CompetitorRecord>>,
    /// Finalizer output.
    pub report: Option<TrendReport>,
}

impl PipelineState {
    /// State for the brand/product entry point — intent extraction is skipped.
    #[must_use]
    pub fn for_subject(brand: &str, product: &str) -> Self {
        Self {
            brand: Some(brand.to_string()),
            product: Some(product.to_string()),
            ..Self::default()
        }
    }

    /// State for the free-text entry point — intent extraction runs first.
    #[must_use]
    pub fn for_query(query: &str) -> Self {
        Self {
            query: Some(query.to_string()),
            ..Self::default()
        }
    }
}
