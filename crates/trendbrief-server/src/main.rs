mod api;
mod jobs;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::jobs::{JobDeps, JobQueue};
use trendbrief_agent::{SonarClient, TavilyClient};
use trendbrief_mailer::{Notifier, SmtpMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trendbrief_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendbrief_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = trendbrief_db::connect_pool(&config.database_url, pool_config).await?;
    trendbrief_db::run_migrations(&pool).await?;

    let providers = &config.providers;
    let search = Arc::new(TavilyClient::with_base_url(
        &providers.tavily_api_key,
        providers.request_timeout_secs,
        providers
            .tavily_base_url
            .as_deref()
            .unwrap_or("https://api.tavily.com/"),
    )?);
    let llm = Arc::new(SonarClient::with_base_url(
        &providers.perplexity_api_key,
        &providers.perplexity_model,
        providers.request_timeout_secs,
        providers
            .perplexity_base_url
            .as_deref()
            .unwrap_or("https://api.perplexity.ai/"),
    )?);

    let notifier: Option<Arc<dyn Notifier>> = match &config.mail {
        Some(mail) => Some(Arc::new(SmtpMailer::new(mail)?)),
        None => {
            tracing::warn!("SMTP not configured; briefs will be persisted but not emailed");
            None
        }
    };

    let jobs = JobQueue::start(
        JobDeps {
            pool: pool.clone(),
            search,
            llm,
            notifier,
        },
        config.queue.capacity,
        config.queue.workers,
    );

    let _scheduler = scheduler::build_scheduler(pool.clone(), jobs.clone()).await?;

    let app = build_app(AppState { pool, jobs });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "trendbrief-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
