//! Shared configuration for trendbrief.
//!
//! Loads the application config from environment variables (with `.env`
//! support via `dotenvy`) and validates it up front, so every binary fails
//! fast on a misconfigured deployment instead of at first use.

mod app_config;
mod config;

use thiserror::Error;

pub use app_config::{
    AppConfig, Environment, MailConfig, PipelineConfig, ProviderConfig, QueueConfig,
};
pub use config::{load_app_config, load_app_config_from_env, load_pipeline_config};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
