//! Pipeline orchestration.

use std::sync::Arc;

use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::search::SearchProvider;
use crate::stages::{extract_intent, fetch_evidence, finalize, refine, synthesize};
use crate::types::{PipelineState, TrendReport};

/// Drives the stages in strict sequence:
/// intent (optional) → evidence → synthesize → refine → finalize.
///
/// The dependency is a straight-line chain; the only structural flexibility
/// is the entry point. Each run owns its [`PipelineState`] exclusively —
/// callers may run independent pipelines concurrently over shared provider
/// handles.
///
/// Failure semantics: there is no stage-level retry. A search or
/// language-model fault propagates to the caller; only synthesis parse
/// errors are recovered locally (see [`crate::stages::synthesize`]).
pub struct TrendPipeline {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LanguageModel>,
}

impl TrendPipeline {
    #[must_use]
    pub fn new(search: Arc<dyn SearchProvider>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { search, llm }
    }

    /// Run the pipeline with intent already known, skipping extraction.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if a provider call fails.
    pub async fn run(&self, brand: &str, product: &str) -> Result<TrendReport, AgentError> {
        let mut state = PipelineState::for_subject(brand, product);
        self.drive(&mut state).await
    }

    /// Run the pipeline from a free-text query, deriving intent first.
    ///
    /// Intent extraction is lenient: if the model response yields no JSON,
    /// brand/product stay absent and the downstream stages degrade to
    /// empty-content queries rather than halting.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if a provider call fails.
    pub async fn run_from_query(&self, query: &str) -> Result<TrendReport, AgentError> {
        let mut state = PipelineState::for_query(query);

        let intent = extract_intent(self.llm.as_ref(), query).await?;
        state.brand = intent.brand;
        state.product = intent.product;
        state.category = intent.category;

        self.drive(&mut state).await
    }

    /// Evidence → synthesize → refine → finalize, threading `state`.
    async fn drive(&self, state: &mut PipelineState) -> Result<TrendReport, AgentError> {
        let brand = state.brand.clone().unwrap_or_default();
        let product = state.product.clone().unwrap_or_default();

        let evidence = fetch_evidence(self.search.as_ref(), &brand, &product).await?;
        state.evidence = Some(evidence);

        let synthesis = synthesize(
            self.llm.as_ref(),
            state.evidence.as_deref().unwrap_or_default(),
            &brand,
            &product,
        )
        .await?;
        state.synthesis = Some(synthesis);

        let refined = refine(
            self.llm.as_ref(),
            state.synthesis.as_deref().unwrap_or_default(),
        )
        .await?;
        state.refined = Some(refined.clone());

        let report = finalize(refined);
        state.report = Some(report.clone());
        Ok(report)
    }
}
