//! Write-side collaborators of the ingestion job: the durable catalog and the
//! full-text index.

use crate::models::movie::MovieRecord;
use thiserror::Error;

/// Failure writing to the catalog store or the search index.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Search index error: {0}")]
    Index(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure reading from the search index during a live search.
#[derive(Debug, Error)]
pub enum IndexQueryError {
    #[error("Search index query timed out")]
    Timeout,

    #[error("Search index unavailable: {0}")]
    Unavailable(String),

    #[error("Search index returned an unreadable response: {0}")]
    Decode(String),
}

impl From<sea_orm::DbErr> for IndexQueryError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Relative weight of one indexed field in relevance scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeight {
    pub field: &'static str,
    pub weight: f32,
}

/// Title matches count double; director and plot count once.
pub const MOVIE_SEARCH_FIELDS: [FieldWeight; 3] = [
    FieldWeight {
        field: "title",
        weight: 2.0,
    },
    FieldWeight {
        field: "director",
        weight: 1.0,
    },
    FieldWeight {
        field: "plot",
        weight: 1.0,
    },
];

/// Durable keyed store of canonical movie records.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts or fully replaces the record keyed by `record.external_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails or times out.
    async fn upsert(&self, record: &MovieRecord) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails or times out.
    async fn get(&self, external_id: &str) -> Result<Option<MovieRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails or times out.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Full-text index over movie records.
#[async_trait::async_trait]
pub trait SearchIndex: Send + Sync {
    /// Creates the index structures if they do not exist yet. Safe to call
    /// repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the index cannot be created.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Inserts or overwrites the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails or times out.
    async fn index_document(&self, key: &str, record: &MovieRecord) -> Result<(), StoreError>;

    /// Runs a ranked full-text query; best match first.
    ///
    /// # Errors
    ///
    /// Returns [`IndexQueryError`] if the index cannot answer.
    async fn query(
        &self,
        term: &str,
        fields: &[FieldWeight],
    ) -> Result<Vec<MovieRecord>, IndexQueryError>;
}
