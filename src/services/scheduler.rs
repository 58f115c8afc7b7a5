use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, RwLock};
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::services::ingestion::IngestionJob;

/// Progress of the first ingestion after process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialRun {
    Idle,
    /// `attempt` attempts have failed so far.
    Retrying { attempt: u32 },
    Ready,
}

impl InitialRun {
    /// State after one more attempt. Exhausting `max_attempts` also lands on
    /// `Ready` so the cron schedule still starts.
    #[must_use]
    pub const fn advance(self, succeeded: bool, max_attempts: u32) -> Self {
        let failed_so_far = match self {
            Self::Ready => return Self::Ready,
            Self::Idle => 0,
            Self::Retrying { attempt } => attempt,
        };

        if succeeded {
            return Self::Ready;
        }

        let attempt = failed_so_far + 1;
        if attempt >= max_attempts {
            Self::Ready
        } else {
            Self::Retrying { attempt }
        }
    }
}

pub struct Scheduler {
    ingestion: Arc<IngestionJob>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
    stop_requested: AtomicBool,
    stop_signal: Notify,
}

impl Scheduler {
    pub fn new(ingestion: Arc<IngestionJob>, config: SchedulerConfig) -> Self {
        Self {
            ingestion,
            config,
            running: Arc::new(RwLock::new(false)),
            stop_requested: AtomicBool::new(false),
            stop_signal: Notify::new(),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        self.run_initial().await;

        if self.should_stop() {
            return Ok(());
        }

        self.run_with_cron(&self.config.cron_expression).await
    }

    fn should_stop(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Runs the first ingestion, retrying with a fixed delay until it succeeds
    /// or the attempts run out. Returns `Ready`, or the state it was in when a
    /// stop cut the retries short.
    pub async fn run_initial(&self) -> InitialRun {
        let max_attempts = self.config.initial_max_attempts.max(1);
        let delay = Duration::from_secs(self.config.initial_retry_delay_seconds);
        let mut state = InitialRun::Idle;
        let mut attempts = 0;

        while state != InitialRun::Ready {
            if self.should_stop() {
                info!(job_name = "initial_ingestion", attempts, "Initial ingestion stopped");
                break;
            }

            attempts += 1;
            info!(
                event = "job_started",
                job_name = "initial_ingestion",
                attempt = attempts,
                "Starting initial ingestion"
            );

            let succeeded = match self.ingestion.run().await {
                Ok(report) => {
                    info!(
                        event = "job_finished",
                        job_name = "initial_ingestion",
                        succeeded = report.succeeded,
                        failed = report.failed,
                        "Initial ingestion finished"
                    );
                    true
                }
                Err(e) => {
                    warn!(
                        event = "job_failed",
                        job_name = "initial_ingestion",
                        attempt = attempts,
                        error = %e,
                        "Initial ingestion attempt failed"
                    );
                    false
                }
            };

            state = state.advance(succeeded, max_attempts);

            match state {
                InitialRun::Ready if !succeeded => {
                    error!(
                        event = "job_exhausted",
                        job_name = "initial_ingestion",
                        attempts,
                        "Initial ingestion gave up; waiting for the next scheduled run"
                    );
                }
                InitialRun::Retrying { .. } => {
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = self.stop_signal.notified() => {}
                    }
                }
                _ => {}
            }
        }

        state
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let ingestion = Arc::clone(&self.ingestion);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let ingestion = Arc::clone(&ingestion);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "ingest_movies", "Starting scheduled ingestion");

                match ingestion.run().await {
                    Ok(report) => info!(
                        event = "job_finished",
                        job_name = "ingest_movies",
                        succeeded = report.succeeded,
                        failed = report.failed,
                        skipped = report.skipped,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Scheduled ingestion finished"
                    ),
                    Err(e) => error!(
                        event = "job_failed",
                        job_name = "ingest_movies",
                        error = %e,
                        "Scheduled ingestion failed"
                    ),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        self.stop_requested.store(true, Ordering::SeqCst);
        self.stop_signal.notify_one();
        *self.running.write().await = false;
        self.ingestion.request_stop();
    }
}
