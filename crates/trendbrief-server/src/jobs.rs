//! Bounded trend-job queue.
//!
//! Requests and refresh sweeps enqueue [`TrendJob`]s; a fixed set of worker
//! tasks drains the queue, runs one pipeline per job, persists the rendered
//! brief, and delivers it. Every job's outcome is captured and logged —
//! nothing is fired and forgotten. Each job owns its pipeline state; workers
//! share only the provider handles and the connection pool.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use trendbrief_agent::{
    default_subject, format_email_body, AgentError, LanguageModel, SearchProvider, TrendPipeline,
};
use trendbrief_db::{upsert_trend_document, DbError, NewTrendDocument, UpsertAction};
use trendbrief_mailer::Notifier;

/// Why a job was enqueued, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Requested,
    Refresh,
}

impl JobKind {
    fn as_str(self) -> &'static str {
        match self {
            JobKind::Requested => "requested",
            JobKind::Refresh => "refresh",
        }
    }
}

/// One unit of work: produce and deliver a brief for a stored trend.
#[derive(Debug, Clone)]
pub struct TrendJob {
    pub trend_id: String,
    pub brand: String,
    pub product: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub email_subject: Option<String>,
    pub metadata: serde_json::Value,
    pub kind: JobKind,
}

/// Shared handles the workers need.
pub struct JobDeps {
    pub pool: PgPool,
    pub search: Arc<dyn SearchProvider>,
    pub llm: Arc<dyn LanguageModel>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("job queue is full")]
    Full,
    #[error("job queue is closed")]
    Closed,
}

#[derive(Debug, Error)]
enum JobError {
    #[error(transparent)]
    Pipeline(#[from] AgentError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Cloneable enqueue handle over the bounded channel.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<TrendJob>,
}

impl JobQueue {
    /// Spawn `workers` worker tasks over a channel of `capacity` slots and
    /// return the enqueue handle.
    #[must_use]
    pub fn start(deps: JobDeps, capacity: usize, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<TrendJob>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let deps = Arc::new(deps);

        for worker in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let deps = Arc::clone(&deps);
            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else {
                        tracing::debug!(worker, "job queue closed; worker exiting");
                        break;
                    };
                    run_job(&deps, worker, job).await;
                }
            });
        }

        Self { tx }
    }

    /// Enqueue without waiting. A full queue is surfaced to the caller
    /// instead of blocking the request handler.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError::Full`] when all slots are taken, or
    /// [`EnqueueError::Closed`] if the workers have shut down.
    pub fn try_enqueue(&self, job: TrendJob) -> Result<(), EnqueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }
}

/// Enqueue one refresh job per stored document, each keyed by that
/// document's own id. Returns (enqueued, skipped) counts; skips happen when
/// the queue fills mid-sweep.
pub async fn enqueue_refresh_sweep(
    pool: &PgPool,
    jobs: &JobQueue,
) -> Result<(usize, usize), DbError> {
    let documents = trendbrief_db::list_trend_documents_for_refresh(pool).await?;

    let mut enqueued = 0usize;
    let mut skipped = 0usize;
    for doc in documents {
        let job = TrendJob {
            trend_id: doc.id,
            brand: doc.brand,
            product: doc.product,
            recipient_email: doc.recipient_email,
            recipient_name: doc.recipient_name,
            email_subject: Some(doc.email_subject),
            metadata: doc.metadata,
            kind: JobKind::Refresh,
        };
        match jobs.try_enqueue(job) {
            Ok(()) => enqueued += 1,
            Err(e) => {
                tracing::warn!(error = %e, "refresh sweep could not enqueue job");
                skipped += 1;
            }
        }
    }

    Ok((enqueued, skipped))
}

/// Run one job and log its captured outcome.
async fn run_job(deps: &JobDeps, worker: usize, job: TrendJob) {
    let trend_id = job.trend_id.clone();
    let brand = job.brand.clone();
    let kind = job.kind;

    match execute(deps, job).await {
        Ok(action) => {
            tracing::info!(
                worker,
                trend_id = %trend_id,
                brand = %brand,
                kind = kind.as_str(),
                action = action.as_str(),
                "trend job complete"
            );
        }
        Err(e) => {
            tracing::error!(
                worker,
                trend_id = %trend_id,
                brand = %brand,
                kind = kind.as_str(),
                error = %e,
                "trend job failed"
            );
        }
    }
}

/// Pipeline → render → persist → deliver.
///
/// A pipeline fault aborts before anything is written: partial results are
/// neither persisted nor delivered. Delivery itself is best effort — a mail
/// failure is logged but does not undo the stored document.
async fn execute(deps: &JobDeps, job: TrendJob) -> Result<UpsertAction, JobError> {
    let pipeline = TrendPipeline::new(Arc::clone(&deps.search), Arc::clone(&deps.llm));
    let report = pipeline.run(&job.brand, &job.product).await?;

    let body = format_email_body(&report.summaries);
    let subject = job
        .email_subject
        .unwrap_or_else(|| default_subject(&job.brand));

    let action = upsert_trend_document(
        &deps.pool,
        &NewTrendDocument {
            id: job.trend_id.clone(),
            brand: job.brand,
            product: job.product,
            recipient_email: job.recipient_email.clone(),
            recipient_name: job.recipient_name.clone(),
            email_subject: subject.clone(),
            email_body: body.clone(),
            metadata: job.metadata,
        },
    )
    .await?;

    if let Some(notifier) = &deps.notifier {
        if let Err(e) = notifier
            .send(&job.recipient_email, &job.recipient_name, &subject, &body)
            .await
        {
            tracing::warn!(
                trend_id = %job.trend_id,
                recipient = %job.recipient_email,
                error = %e,
                "brief persisted but delivery failed"
            );
        }
    }

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trendbrief_agent::SearchResult;

    struct StalledSearch;

    #[async_trait::async_trait]
    impl SearchProvider for StalledSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, AgentError> {
            std::future::pending().await
        }
    }

    struct WorkingSearch;

    #[async_trait::async_trait]
    impl SearchProvider for WorkingSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AgentError> {
            Ok(vec![SearchResult {
                title: Some("result".to_string()),
                url: Some("https://example.com".to_string()),
                content: Some(format!("evidence for {query}")),
            }])
        }
    }

    struct StubLlm;

    #[async_trait::async_trait]
    impl LanguageModel for StubLlm {
        async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
            if prompt.contains("analyzing competitor strategies") {
                return Ok(
                    r#"[{"heading": "Rival", "summary": "Launched.", "engagement": "High"}]"#
                        .to_string(),
                );
            }
            Ok("Rewritten summary.".to_string())
        }
    }

    fn job(id: &str) -> TrendJob {
        TrendJob {
            trend_id: id.to_string(),
            brand: "Acme".to_string(),
            product: "fragrance".to_string(),
            recipient_email: format!("{id}@example.com"),
            recipient_name: "Casey".to_string(),
            email_subject: None,
            metadata: serde_json::json!({}),
            kind: JobKind::Requested,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn try_enqueue_reports_full_when_capacity_exhausted(pool: sqlx::PgPool) {
        // One worker stalled forever on its first job, one buffered slot.
        // At most two enqueues can ever succeed.
        let queue = JobQueue::start(
            JobDeps {
                pool,
                search: Arc::new(StalledSearch),
                llm: Arc::new(StubLlm),
                notifier: None,
            },
            1,
            1,
        );

        let results: Vec<_> = (0..3)
            .map(|i| queue.try_enqueue(job(&format!("job-full-{i}"))))
            .collect();

        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(EnqueueError::Full))),
            "expected at least one Full, got: {results:?}"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn worker_persists_document_with_default_subject(pool: sqlx::PgPool) {
        let queue = JobQueue::start(
            JobDeps {
                pool: pool.clone(),
                search: Arc::new(WorkingSearch),
                llm: Arc::new(StubLlm),
                notifier: None,
            },
            4,
            1,
        );

        queue.try_enqueue(job("job-persist-1")).expect("enqueue");

        let mut stored = None;
        for _ in 0..100 {
            match trendbrief_db::get_trend_document(&pool, "job-persist-1").await {
                Ok(row) => {
                    stored = Some(row);
                    break;
                }
                Err(DbError::NotFound) => tokio::time::sleep(Duration::from_millis(50)).await,
                Err(e) => panic!("unexpected db error: {e}"),
            }
        }

        let row = stored.expect("worker should persist the document");
        assert_eq!(row.email_subject, "Acme - Trend Summary");
        assert!(row.email_body.contains("📌 *Rival*"));
        assert!(row.email_body.contains("Rewritten summary."));
        assert!(row.email_body.contains("🔸 Engagement: High"));
    }
}
