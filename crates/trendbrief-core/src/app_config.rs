use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Search and language-model provider settings.
#[derive(Clone)]
pub struct ProviderConfig {
    pub tavily_api_key: String,
    /// Overridable for tests; `None` uses the production endpoint.
    pub tavily_base_url: Option<String>,
    pub perplexity_api_key: String,
    pub perplexity_base_url: Option<String>,
    pub perplexity_model: String,
    pub request_timeout_secs: u64,
}

/// SMTP delivery settings. Absent entirely when mail is not configured.
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

/// The subset of configuration the pipeline itself needs: providers and
/// optional mail delivery. The CLI loads this instead of [`AppConfig`] so a
/// one-off run does not require a database.
#[derive(Clone)]
pub struct PipelineConfig {
    pub providers: ProviderConfig,
    pub mail: Option<MailConfig>,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("providers", &self.providers)
            .field("mail", &self.mail.as_ref().map(|_| "[configured]"))
            .finish()
    }
}

/// Trend job queue sizing.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub capacity: usize,
    pub workers: usize,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub providers: ProviderConfig,
    pub mail: Option<MailConfig>,
    pub queue: QueueConfig,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("providers", &self.providers)
            .field("mail", &self.mail.as_ref().map(|_| "[configured]"))
            .field("queue", &self.queue)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("tavily_api_key", &"[redacted]")
            .field("tavily_base_url", &self.tavily_base_url)
            .field("perplexity_api_key", &"[redacted]")
            .field("perplexity_base_url", &self.perplexity_base_url)
            .field("perplexity_model", &self.perplexity_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
