//! Language model abstraction and the Perplexity chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai/";

/// Seam between the pipeline and the language model.
///
/// Treated as a pure text-in/text-out function with no conversational memory
/// between calls. Occasional malformed output is expected; the synthesis
/// stage tolerates it with a fallback record.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt and return the model's text response.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport or provider failure; the pipeline
    /// does not recover these.
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Client for Perplexity's OpenAI-compatible chat-completions API.
///
/// Sends each prompt as a single user message. Use [`SonarClient::new`] for
/// production or [`SonarClient::with_base_url`] to point at a mock server in
/// tests.
pub struct SonarClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl SonarClient {
    /// Creates a new client pointed at the production Perplexity API.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AgentError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AgentError::LanguageModel`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
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
            .map_err(|e| AgentError::LanguageModel(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    fn completions_url(&self) -> Result<Url, AgentError> {
        self.base_url
            .join("chat/completions")
            .map_err(|e| AgentError::LanguageModel(format!("invalid completions URL: {e}")))
    }
}

#[async_trait]
impl LanguageModel for SonarClient {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let url = self.completions_url()?;
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AgentError::LanguageModel(format!(
                "language model returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AgentError::Deserialize {
                context: "chat/completions".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::LanguageModel("response contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_appends_path() {
        let client = SonarClient::with_base_url("key", "sonar", 30, "http://localhost:9999")
            .expect("client construction should not fail");
        assert_eq!(
            client.completions_url().expect("join").as_str(),
            "http://localhost:9999/chat/completions"
        );
    }

    #[test]
    fn chat_request_serializes_single_user_message() {
        let request = ChatRequest {
            model: "sonar",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["model"], "sonar");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }
}
