use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search provider error: {0}")]
    Search(String),

    #[error("language model error: {0}")]
    LanguageModel(String),

    #[error("deserialize error in {context}: {source}")]
    Deserialize {
        context: String,
        source: serde_json::Error,
    },
}
