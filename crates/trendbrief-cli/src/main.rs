//! One-off pipeline runs from the command line.
//!
//! Runs the competitor-trend pipeline without the server: no database, no
//! queue. The rendered brief goes to stdout, and optionally to a recipient
//! when SMTP is configured and `--to` is given.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use trendbrief_agent::{
    default_subject, format_email_body, SonarClient, TavilyClient, TrendPipeline,
};
use trendbrief_mailer::{Notifier, SmtpMailer};

#[derive(Debug, Parser)]
#[command(name = "trendbrief-cli")]
#[command(about = "Trendbrief command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the pipeline once and print the rendered brief.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Subject brand, paired with --product.
    #[arg(long, requires = "product", conflicts_with = "query")]
    brand: Option<String>,

    /// Product category, paired with --brand.
    #[arg(long, requires = "brand", conflicts_with = "query")]
    product: Option<String>,

    /// Free-text request; brand and product are extracted from it.
    #[arg(long)]
    query: Option<String>,

    /// Email the brief to this address (requires SMTP configuration).
    #[arg(long, requires = "name")]
    to: Option<String>,

    /// Recipient display name, paired with --to.
    #[arg(long, requires = "to")]
    name: Option<String>,

    /// Override the email subject line.
    #[arg(long)]
    subject: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = trendbrief_core::load_pipeline_config()?;
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

    let pipeline = TrendPipeline::new(search, llm);

    let (report, brand) = match (&args.brand, &args.product, &args.query) {
        (Some(brand), Some(product), None) => {
            tracing::info!(brand = %brand, product = %product, "running pipeline");
            (pipeline.run(brand, product).await?, Some(brand.clone()))
        }
        (None, None, Some(query)) => {
            tracing::info!(query = %query, "running pipeline from free text");
            (pipeline.run_from_query(query).await?, None)
        }
        _ => bail!("pass either --brand and --product, or --query"),
    };

    let body = format_email_body(&report.summaries);
    let subject = subject_line(args.subject, brand.as_deref());

    println!("{subject}\n");
    println!("{body}");

    send_if_requested(args.to, args.name, &config, &subject, &body).await
}

/// Subject precedence: explicit override, then the brand default. The
/// free-text entry point has no known brand, so it falls back to a neutral
/// line instead of quoting the whole query.
fn subject_line(override_subject: Option<String>, brand: Option<&str>) -> String {
    override_subject
        .or_else(|| brand.map(default_subject))
        .unwrap_or_else(|| "Trend Summary".to_string())
}

async fn send_if_requested(
    to: Option<String>,
    name: Option<String>,
    config: &trendbrief_core::PipelineConfig,
    subject: &str,
    body: &str,
) -> anyhow::Result<()> {
    if let Some(to) = to {
        let name = name.unwrap_or_default();
        let mail = config
            .mail
            .as_ref()
            .context("--to given but SMTP is not configured")?;
        let mailer = SmtpMailer::new(mail)?;
        mailer.send(&to, &name, subject, body).await?;
        tracing::info!(recipient = %to, "brief emailed");
    }

    Ok(())
}
