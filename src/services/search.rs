//! Cache-aside search over the full-text index.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Provenance, SearchQuery};
use crate::models::movie::MovieRecord;
use crate::services::catalog::{IndexQueryError, MOVIE_SEARCH_FIELDS, SearchIndex};
use crate::services::result_cache::{ResultCache, cache_key};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Index(#[from] IndexQueryError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<MovieRecord>,
    pub source: Provenance,
}

pub struct SearchService {
    index: Arc<dyn SearchIndex>,
    cache: Arc<dyn ResultCache>,
    ttl: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>, cache: Arc<dyn ResultCache>, ttl: Duration) -> Self {
        Self { index, cache, ttl }
    }

    /// Answers `raw_query` from the cache when possible, otherwise from the
    /// index, refilling the cache on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for blank input and
    /// [`SearchError::Index`] when the index cannot answer. Cache failures never
    /// surface here.
    pub async fn search(&self, raw_query: &str) -> Result<SearchOutcome, SearchError> {
        let query = SearchQuery::parse(raw_query).ok_or(SearchError::EmptyQuery)?;
        let key = cache_key(&query);

        match self.cache.get(&key).await {
            Ok(Some(results)) => {
                debug!(query = %query, hits = results.len(), "Search served from cache");
                metrics::counter!("search_requests_total", "source" => Provenance::Cache.as_str())
                    .increment(1);
                return Ok(SearchOutcome {
                    results,
                    source: Provenance::Cache,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(query = %query, error = %e, "Result cache read failed, falling back to index");
                metrics::counter!("result_cache_errors_total", "operation" => "get").increment(1);
            }
        }

        let results = self
            .index
            .query(query.as_str(), &MOVIE_SEARCH_FIELDS)
            .await?;

        if let Err(e) = self.cache.set(&key, &results, self.ttl).await {
            warn!(query = %query, error = %e, "Result cache write failed");
            metrics::counter!("result_cache_errors_total", "operation" => "set").increment(1);
        }

        debug!(query = %query, hits = results.len(), "Search served from index");
        metrics::counter!("search_requests_total", "source" => Provenance::Index.as_str())
            .increment(1);

        Ok(SearchOutcome {
            results,
            source: Provenance::Index,
        })
    }
}
