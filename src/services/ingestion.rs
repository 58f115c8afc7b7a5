//! Bulk ingestion: provider listing → details → catalog upsert → index write,
//! then a full search-cache invalidation.

use futures::{StreamExt, stream};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::IngestionConfig;
use crate::models::movie::MovieStub;
use crate::services::catalog::{CatalogStore, SearchIndex};
use crate::services::metadata::{MetadataProvider, ProviderError};
use crate::services::result_cache::{ResultCache, SEARCH_KEY_PREFIX};

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Failed to list ingestion candidates: {0}")]
    CandidateList(#[source] ProviderError),
}

/// What happened to a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Stored,
    NotFound,
    Failed,
    Cancelled,
}

impl ItemOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::NotFound => "not_found",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: u32,
    pub candidates: u32,
    pub cancelled: bool,
    pub cache_invalidated: bool,
}

impl IngestionReport {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Stored => self.succeeded += 1,
            ItemOutcome::NotFound => self.skipped += 1,
            ItemOutcome::Failed => self.failed += 1,
            ItemOutcome::Cancelled => self.cancelled = true,
        }
    }
}

pub struct IngestionJob {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn CatalogStore>,
    index: Arc<dyn SearchIndex>,
    cache: Arc<dyn ResultCache>,
    topic: String,
    year: String,
    concurrency: usize,
    stop_requested: AtomicBool,
}

impl IngestionJob {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn CatalogStore>,
        index: Arc<dyn SearchIndex>,
        cache: Arc<dyn ResultCache>,
        config: &IngestionConfig,
    ) -> Self {
        Self {
            provider,
            store,
            index,
            cache,
            topic: config.topic.clone(),
            year: config.year.clone(),
            concurrency: config.concurrency.max(1),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Asks a running job to stop. Items already in flight complete; the rest
    /// are reported as cancelled. A request made while no run is active
    /// cancels the next run before it touches any item.
    pub fn request_stop(&self) {
        info!(event = "ingestion_stop_requested", "Ingestion stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn should_stop(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Runs one full ingestion pass.
    ///
    /// # Errors
    ///
    /// Fails only when the candidate listing cannot be loaded, in which case no
    /// item is touched and the cache is left alone.
    pub async fn run(&self) -> Result<IngestionReport, IngestionError> {
        let start = Instant::now();

        info!(
            event = "ingestion_started",
            topic = %self.topic,
            year = %self.year,
            concurrency = self.concurrency,
            "Starting ingestion"
        );

        let candidates = match self.provider.list_by_query(&self.topic, &self.year).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(event = "ingestion_failed", error = %e, "Failed to list candidates");
                metrics::counter!("ingestion_runs_total", "outcome" => "failed").increment(1);
                return Err(IngestionError::CandidateList(e));
            }
        };

        let mut report = IngestionReport {
            candidates: u32::try_from(candidates.len()).unwrap_or(u32::MAX),
            ..IngestionReport::default()
        };

        // Owned stubs keep the stream future `Send` for spawned callers.
        let outcomes: Vec<ItemOutcome> = stream::iter(candidates)
            .map(|stub| async move { self.process_item(&stub).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            metrics::counter!("ingestion_items_total", "outcome" => outcome.as_str()).increment(1);
            report.record(outcome);
        }

        match self.cache.invalidate_all(SEARCH_KEY_PREFIX).await {
            Ok(removed) => {
                debug!(removed, "Search cache invalidated");
                report.cache_invalidated = true;
            }
            Err(e) => {
                warn!(error = %e, "Failed to invalidate search cache after ingestion");
            }
        }

        // A stop is consumed by the run it landed in, never by a later one.
        self.stop_requested.store(false, Ordering::SeqCst);

        metrics::counter!("ingestion_runs_total", "outcome" => "completed").increment(1);
        info!(
            event = "ingestion_finished",
            candidates = report.candidates,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            cache_invalidated = report.cache_invalidated,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Ingestion finished"
        );

        Ok(report)
    }

    async fn process_item(&self, stub: &MovieStub) -> ItemOutcome {
        if self.should_stop() {
            return ItemOutcome::Cancelled;
        }

        let id = stub.external_id.as_str();

        let record = match self.provider.get_details(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(external_id = %id, "Provider has no details, skipping");
                return ItemOutcome::NotFound;
            }
            Err(e) => {
                warn!(external_id = %id, error = %e, "Detail lookup failed");
                return ItemOutcome::Failed;
            }
        };

        if let Err(e) = self.store.upsert(&record).await {
            warn!(external_id = %id, error = %e, "Catalog upsert failed");
            return ItemOutcome::Failed;
        }

        if let Err(e) = self.index.index_document(&record.external_id, &record).await {
            warn!(external_id = %id, error = %e, "Index write failed");
            return ItemOutcome::Failed;
        }

        debug!(external_id = %id, title = %record.title, "Movie ingested");
        ItemOutcome::Stored
    }
}
