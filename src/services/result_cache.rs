//! Ephemeral cache of search answers keyed by normalized query.

use crate::domain::SearchQuery;
use crate::models::movie::MovieRecord;
use std::time::Duration;
use thiserror::Error;

/// Every search entry lives under this prefix; ingestion invalidates it wholesale.
pub const SEARCH_KEY_PREFIX: &str = "search:";

/// Cache store failure. Callers log these and carry on.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache operation timed out")]
    Timeout,

    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache entry is corrupt: {0}")]
    Corrupt(String),
}

impl From<sea_orm::DbErr> for CacheError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Derives the cache key for a query.
///
/// # Examples
///
/// ```
/// # use cinedex::domain::SearchQuery;
/// # use cinedex::services::result_cache::cache_key;
/// let q = SearchQuery::parse(" Space ").unwrap();
/// assert_eq!(cache_key(&q), "search:space");
/// ```
#[must_use]
pub fn cache_key(query: &SearchQuery) -> String {
    format!("{SEARCH_KEY_PREFIX}{}", query.as_str())
}

#[async_trait::async_trait]
pub trait ResultCache: Send + Sync {
    /// Returns the cached answer, or `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] only when the store itself fails, never for a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<MovieRecord>>, CacheError>;

    /// Stores `records` under `key` for `ttl`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the write fails.
    async fn set(&self, key: &str, records: &[MovieRecord], ttl: Duration)
    -> Result<(), CacheError>;

    /// Drops every entry whose key starts with `prefix`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the delete fails.
    async fn invalidate_all(&self, prefix: &str) -> Result<u64, CacheError>;
}
