//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! refresh sweep, which re-runs the pipeline for every stored brief.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::jobs::{enqueue_refresh_sweep, JobQueue};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    jobs: JobQueue,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, pool, jobs).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the daily refresh sweep.
///
/// Runs every day at 06:00 UTC (`0 0 6 * * *`). Each stored document gets
/// one queued job keyed by its own id; the sweep only enqueues, the workers
/// do the pipeline runs.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    jobs: JobQueue,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 6 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let jobs = jobs.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting daily trend refresh sweep");
            match enqueue_refresh_sweep(&pool, &jobs).await {
                Ok((enqueued, skipped)) => {
                    tracing::info!(enqueued, skipped, "scheduler: refresh sweep queued");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: refresh sweep failed to load documents");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
