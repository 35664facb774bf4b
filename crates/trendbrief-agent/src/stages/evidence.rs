//! Evidence fetch: targeted competitor searches, merged and deduplicated.

use std::collections::HashSet;

use crate::error::AgentError;
use crate::search::SearchProvider;

/// Cap on merged evidence items after deduplication.
const MAX_EVIDENCE_ITEMS: usize = 6;

/// The three fixed query templates. All of them frame the search around
/// competitors of `brand`, never the brand itself.
fn competitor_queries(brand: &str, product: &str) -> [String; 3] {
    [
        format!(
            "What are recent social media campaigns by competitors of {brand} in the {product} space?"
        ),
        format!(
            "What influencer strategies are being used by brands competing with {brand} in {product}?"
        ),
        format!(
            "What are {brand}'s competitors doing in the {product} category on social platforms?"
        ),
    ]
}

/// Run the three competitor queries and merge their textual results.
///
/// Every result exposing a `content` field contributes to the candidate
/// pool. The pool is deduplicated by exact text equality (first occurrence
/// wins), capped at [`MAX_EVIDENCE_ITEMS`], and joined with blank lines.
///
/// No results at all is not an error: the merged block is simply empty and
/// the synthesis stage handles it.
///
/// # Errors
///
/// Returns [`AgentError`] if any query fails at the provider level.
pub async fn fetch_evidence(
    search: &dyn SearchProvider,
    brand: &str,
    product: &str,
) -> Result<String, AgentError> {
    tracing::info!(brand, product, "fetching competitor evidence");

    let mut candidates: Vec<String> = Vec::new();
    for query in competitor_queries(brand, product) {
        let results = search.search(&query).await?;
        tracing::debug!(query = %query, count = results.len(), "search query returned");
        candidates.extend(results.into_iter().filter_map(|r| r.content));
    }

    let mut seen: HashSet<String> = HashSet::new();
    candidates.retain(|text| seen.insert(text.clone()));
    candidates.truncate(MAX_EVIDENCE_ITEMS);

    Ok(candidates.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResult;
    use async_trait::async_trait;

    /// Fake provider returning the same canned results for every query.
    struct FixedSearch(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AgentError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AgentError> {
            Err(AgentError::Search("rate limited".to_string()))
        }
    }

    fn result(content: &str) -> SearchResult {
        SearchResult {
            title: None,
            url: None,
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn queries_substitute_brand_and_keep_competitor_framing() {
        let queries = competitor_queries("Dior", "perfume");
        assert_eq!(queries.len(), 3);
        for q in &queries {
            assert!(q.contains("Dior"));
            assert!(q.contains("perfume"));
            assert!(
                q.contains("competitors") || q.contains("competing"),
                "query must keep competitor framing: {q}"
            );
        }
    }

    #[tokio::test]
    async fn duplicate_content_appears_at_most_once() {
        // Same results for all three queries — everything is a duplicate
        // after the first pass.
        let search = FixedSearch(vec![result("alpha"), result("beta"), result("alpha")]);
        let merged = fetch_evidence(&search, "Dior", "perfume")
            .await
            .expect("fetch should succeed");
        assert_eq!(merged.matches("alpha").count(), 1);
        assert_eq!(merged.matches("beta").count(), 1);
    }

    #[tokio::test]
    async fn merged_output_is_capped_at_six_items() {
        let search = FixedSearch(
            (0..10)
                .map(|i| result(&format!("snippet {i}")))
                .collect(),
        );
        let merged = fetch_evidence(&search, "Dior", "perfume")
            .await
            .expect("fetch should succeed");
        assert_eq!(merged.split("\n\n").count(), 6);
    }

    #[tokio::test]
    async fn results_without_content_are_ignored() {
        let search = FixedSearch(vec![
            SearchResult {
                title: Some("title only".to_string()),
                url: Some("https://example.com".to_string()),
                content: None,
            },
            result("kept"),
        ]);
        let merged = fetch_evidence(&search, "Dior", "perfume")
            .await
            .expect("fetch should succeed");
        assert_eq!(merged, "kept");
    }

    #[tokio::test]
    async fn no_results_yields_empty_string() {
        let search = FixedSearch(vec![]);
        let merged = fetch_evidence(&search, "Dior", "perfume")
            .await
            .expect("empty evidence is not an error");
        assert_eq!(merged, "");
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let err = fetch_evidence(&FailingSearch, "Dior", "perfume")
            .await
            .expect_err("provider fault must propagate");
        assert!(matches!(err, AgentError::Search(_)));
    }
}
