//! Synthesis: evidence text → structured competitor records.

use serde::Deserialize;

use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::prompts;
use crate::types::{CompetitorRecord, ENGAGEMENT_NOT_SPECIFIED};

/// Raw record shape expected from the model. `heading` and `summary` are
/// required; `engagement` may be absent and is normalized afterwards.
#[derive(Debug, Deserialize)]
struct RawRecord {
    heading: String,
    summary: String,
    #[serde(default)]
    engagement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordListPayload {
    summaries: Vec<RawRecord>,
}

/// Prompt the model with the merged evidence and parse its structured reply.
///
/// The response must match the record-list schema, either as an object with
/// a `summaries` array or as a bare array (the few-shot example shape). A
/// markdown code fence around the JSON is tolerated. Normalization:
///
/// - absent or all-whitespace engagement becomes [`ENGAGEMENT_NOT_SPECIFIED`];
/// - records whose heading equals the subject brand (case-insensitive) are
///   dropped — the synthesis contract covers competitors only.
///
/// If parsing fails for any reason the stage does not raise: it returns a
/// single fallback record with heading `"Fallback"`, the trimmed raw model
/// output as summary, and the engagement sentinel. The synthesis result is
/// therefore always non-empty and well typed, even under model misbehavior.
///
/// # Errors
///
/// Returns [`AgentError`] only on language-model transport failure.
pub async fn synthesize(
    llm: &dyn LanguageModel,
    evidence: &str,
    brand: &str,
    product: &str,
) -> Result<Vec<CompetitorRecord>, AgentError> {
    tracing::info!(brand, product, "synthesizing competitor records");

    let output = llm
        .complete(&prompts::synthesis_prompt(evidence, brand, product))
        .await?;

    match parse_records(&output) {
        Ok(raw) => Ok(normalize(raw, brand)),
        Err(e) => {
            tracing::warn!(error = %e, "synthesis parse failed; using fallback record");
            Ok(vec![CompetitorRecord {
                heading: "Fallback".to_string(),
                summary: output.trim().to_string(),
                engagement: ENGAGEMENT_NOT_SPECIFIED.to_string(),
            }])
        }
    }
}

/// Strict schema parse of the model output.
fn parse_records(output: &str) -> Result<Vec<RawRecord>, serde_json::Error> {
    let body = strip_code_fence(output.trim());

    match serde_json::from_str::<RecordListPayload>(body) {
        Ok(payload) => Ok(payload.summaries),
        Err(object_err) => {
            // The few-shot example demonstrates a bare array; accept that
            // shape too before giving up.
            serde_json::from_str::<Vec<RawRecord>>(body).map_err(|_| object_err)
        }
    }
}

/// Remove a surrounding markdown code fence (``` or ```json), if present.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(stripped) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line.
    match stripped.find('\n') {
        Some(idx) => stripped[idx + 1..].trim(),
        None => stripped.trim(),
    }
}

fn normalize(raw: Vec<RawRecord>, brand: &str) -> Vec<CompetitorRecord> {
    raw.into_iter()
        .filter(|r| !r.heading.trim().is_empty())
        .filter(|r| !r.heading.trim().eq_ignore_ascii_case(brand.trim()))
        .map(|r| CompetitorRecord {
            heading: r.heading,
            summary: r.summary,
            engagement: match r.engagement {
                Some(e) if !e.trim().is_empty() => e,
                _ => ENGAGEMENT_NOT_SPECIFIED.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedLlm(String);

    #[async_trait]
    impl LanguageModel for FixedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, AgentError> {
            Ok(self.0.clone())
        }
    }

    fn valid_payload() -> String {
        serde_json::json!({
            "summaries": [
                {
                    "heading": "Tom Ford",
                    "summary": "Tom Ford uses Instagram and TikTok for influencer pushes.",
                    "engagement": "High on TikTok."
                },
                {
                    "heading": "Byredo",
                    "summary": "Byredo leans on Reels and storytelling.",
                    "engagement": "   "
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn parses_object_payload_and_normalizes_blank_engagement() {
        let llm = FixedLlm(valid_payload());
        let records = synthesize(&llm, "evidence", "Dior", "perfume")
            .await
            .expect("synthesis should not fail");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].heading, "Tom Ford");
        assert_eq!(records[0].engagement, "High on TikTok.");
        assert_eq!(records[1].engagement, ENGAGEMENT_NOT_SPECIFIED);
    }

    #[tokio::test]
    async fn accepts_bare_array_payload() {
        let llm = FixedLlm(
            r#"[{"heading": "Tom Ford", "summary": "Instagram push.", "engagement": "High"}]"#
                .to_string(),
        );
        let records = synthesize(&llm, "evidence", "Dior", "perfume")
            .await
            .expect("synthesis should not fail");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, "Tom Ford");
    }

    #[tokio::test]
    async fn accepts_fenced_payload() {
        let llm = FixedLlm(format!("```json\n{}\n```", valid_payload()));
        let records = synthesize(&llm, "evidence", "Dior", "perfume")
            .await
            .expect("synthesis should not fail");
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn invalid_json_yields_exactly_one_fallback_record() {
        let llm = FixedLlm("Sorry, I cannot comply".to_string());
        let records = synthesize(&llm, "evidence", "Dior", "perfume")
            .await
            .expect("fallback must not raise");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, "Fallback");
        assert_eq!(records[0].summary, "Sorry, I cannot comply");
        assert_eq!(records[0].engagement, ENGAGEMENT_NOT_SPECIFIED);
    }

    #[tokio::test]
    async fn missing_required_field_yields_fallback() {
        // "summary" missing — schema mismatch, not a partial parse.
        let llm = FixedLlm(r#"{"summaries": [{"heading": "Tom Ford"}]}"#.to_string());
        let records = synthesize(&llm, "evidence", "Dior", "perfume")
            .await
            .expect("fallback must not raise");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, "Fallback");
    }

    #[tokio::test]
    async fn subject_brand_records_are_dropped_case_insensitively() {
        let llm = FixedLlm(
            serde_json::json!({
                "summaries": [
                    {"heading": "Tom Ford", "summary": "Tom Ford uses Instagram to push AR filters.", "engagement": "High"},
                    {"heading": "DIOR", "summary": "Dior itself runs campaigns.", "engagement": "High"}
                ]
            })
            .to_string(),
        );
        let records = synthesize(&llm, "Tom Ford uses Instagram...", "Dior", "perfume")
            .await
            .expect("synthesis should not fail");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, "Tom Ford");
        assert!(records.iter().all(|r| !r.heading.eq_ignore_ascii_case("Dior")));
    }

    #[tokio::test]
    async fn empty_evidence_still_returns_well_typed_result() {
        let llm = FixedLlm(r#"{"summaries": []}"#.to_string());
        let records = synthesize(&llm, "", "Dior", "perfume")
            .await
            .expect("empty evidence must not raise");
        assert!(records.is_empty());
    }

    #[test]
    fn strip_code_fence_leaves_plain_text_alone() {
        assert_eq!(strip_code_fence("plain"), "plain");
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
    }
}
