//! Refinement: independent editorial rewrite of each record's summary.

use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::prompts;
use crate::types::CompetitorRecord;

/// Rewrite each record's summary for clarity and concision.
///
/// The output list has the same length as the input, and each record keeps
/// its (heading, engagement) pair untouched; only the summary is replaced
/// with the trimmed model response. Records are refined independently — no
/// record's rewrite depends on another's.
///
/// # Errors
///
/// Returns [`AgentError`] on language-model transport failure.
pub async fn refine(
    llm: &dyn LanguageModel,
    records: &[CompetitorRecord],
) -> Result<Vec<CompetitorRecord>, AgentError> {
    tracing::info!(count = records.len(), "refining competitor summaries");

    let mut refined = Vec::with_capacity(records.len());
    for record in records {
        let output = llm.complete(&prompts::refine_prompt(&record.summary)).await?;
        refined.push(CompetitorRecord {
            heading: record.heading.clone(),
            summary: output.trim().to_string(),
            engagement: record.engagement.clone(),
        });
    }

    Ok(refined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Fake that echoes a marked version of the summary it was given.
    struct EchoLlm;

    #[async_trait]
    impl LanguageModel for EchoLlm {
        async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
            let summary = prompt
                .rsplit("Original Summary:")
                .next()
                .unwrap_or_default()
                .trim();
            Ok(format!("  refined: {summary}  "))
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LanguageModel for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, AgentError> {
            Err(AgentError::LanguageModel("timeout".to_string()))
        }
    }

    fn record(heading: &str, summary: &str, engagement: &str) -> CompetitorRecord {
        CompetitorRecord {
            heading: heading.to_string(),
            summary: summary.to_string(),
            engagement: engagement.to_string(),
        }
    }

    #[tokio::test]
    async fn preserves_length_order_heading_and_engagement() {
        let input = vec![
            record("Tom Ford", "first summary", "High"),
            record("Byredo", "second summary", "Not specified"),
            record("Le Labo", "third summary", "Moderate"),
        ];
        let output = refine(&EchoLlm, &input).await.expect("refine should succeed");

        assert_eq!(output.len(), input.len());
        for (i, refined) in output.iter().enumerate() {
            assert_eq!(refined.heading, input[i].heading);
            assert_eq!(refined.engagement, input[i].engagement);
            assert_ne!(refined.summary, input[i].summary);
        }
    }

    #[tokio::test]
    async fn replaces_summary_with_trimmed_model_output() {
        let input = vec![record("Tom Ford", "original", "High")];
        let output = refine(&EchoLlm, &input).await.expect("refine should succeed");
        assert_eq!(output[0].summary, "refined: original");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let output = refine(&EchoLlm, &[]).await.expect("refine should succeed");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let input = vec![record("Tom Ford", "summary", "High")];
        let err = refine(&FailingLlm, &input)
            .await
            .expect_err("provider fault must propagate");
        assert!(matches!(err, AgentError::LanguageModel(_)));
    }
}
