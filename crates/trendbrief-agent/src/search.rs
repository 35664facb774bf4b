//! Web search provider abstraction and the Tavily HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com/";

/// One search hit. Only `content` feeds the pipeline; title and URL are kept
/// for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Seam between the pipeline and whatever answers search queries.
///
/// No ordering or freshness guarantee is assumed from implementations.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return its results.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport or provider failure; the pipeline
    /// does not recover these.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AgentError>;
}

/// Client for the Tavily search API.
///
/// Use [`TavilyClient::new`] for production or
/// [`TavilyClient::with_base_url`] to point at a mock server in tests.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

impl TavilyClient {
    /// Creates a new client pointed at the production Tavily API.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AgentError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AgentError::Search`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("trendbrief/0.1 (competitor-trends)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| AgentError::Search(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn search_url(&self) -> Result<Url, AgentError> {
        self.base_url
            .join("search")
            .map_err(|e| AgentError::Search(format!("invalid search URL: {e}")))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AgentError> {
        let url = self.search_url()?;
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
        };

        let response = self.client.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Search(format!(
                "search provider returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| AgentError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;

        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let client = TavilyClient::with_base_url("key", 30, "https://api.tavily.com///")
            .expect("client construction should not fail");
        assert_eq!(client.base_url.as_str(), "https://api.tavily.com/");
    }

    #[test]
    fn search_url_appends_path() {
        let client = TavilyClient::with_base_url("key", 30, "http://localhost:9999")
            .expect("client construction should not fail");
        assert_eq!(
            client.search_url().expect("join").as_str(),
            "http://localhost:9999/search"
        );
    }

    #[test]
    fn search_result_tolerates_missing_fields() {
        let result: SearchResult = serde_json::from_str(r#"{"url": "https://example.com"}"#)
            .expect("partial result should deserialize");
        assert!(result.content.is_none());
        assert!(result.title.is_none());
    }
}
