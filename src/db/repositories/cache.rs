use crate::db::bounded;
use crate::entities::{prelude::*, search_cache};
use crate::models::movie::MovieRecord;
use crate::services::result_cache::{CacheError, ResultCache};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::time::Duration;
use tracing::debug;

/// Fixed-width UTC timestamps so string comparison orders them chronologically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Expiry instant for `ttl`, clamped to the last second of year 9999 so the
/// stored string keeps its four-digit year.
fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    let ceiling = NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(now, |n| n.and_utc());

    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map_or(ceiling, |at| at.min(ceiling))
}

/// Search answers kept in the `search_cache` table.
pub struct SqliteResultCache {
    conn: DatabaseConnection,
    op_timeout: Duration,
}

impl SqliteResultCache {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    async fn purge_expired(&self, now: &str) {
        match SearchCache::delete_many()
            .filter(search_cache::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
        {
            Ok(res) if res.rows_affected > 0 => {
                debug!(removed = res.rows_affected, "Purged expired search cache entries");
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Search cache purge failed"),
        }
    }
}

#[async_trait::async_trait]
impl ResultCache for SqliteResultCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<MovieRecord>>, CacheError> {
        bounded(self.op_timeout, || CacheError::Timeout, async {
            let now = timestamp(Utc::now());
            self.purge_expired(&now).await;

            let entry = SearchCache::find_by_id(key.to_string())
                .filter(search_cache::Column::ExpiresAt.gt(&now))
                .one(&self.conn)
                .await
                .map_err(CacheError::from)?;

            entry
                .map(|e| {
                    serde_json::from_str::<Vec<MovieRecord>>(&e.results_json)
                        .map_err(|err| CacheError::Corrupt(format!("{key}: {err}")))
                })
                .transpose()
        })
        .await
    }

    async fn set(
        &self,
        key: &str,
        records: &[MovieRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let results_json = serde_json::to_string(records)
            .map_err(|e| CacheError::Corrupt(format!("{key}: {e}")))?;

        bounded(self.op_timeout, || CacheError::Timeout, async {
            let now = Utc::now();
            let active_model = search_cache::ActiveModel {
                cache_key: Set(key.to_string()),
                results_json: Set(results_json),
                created_at: Set(timestamp(now)),
                expires_at: Set(timestamp(expiry(now, ttl))),
            };

            SearchCache::insert(active_model)
                .on_conflict(
                    OnConflict::column(search_cache::Column::CacheKey)
                        .update_columns([
                            search_cache::Column::ResultsJson,
                            search_cache::Column::CreatedAt,
                            search_cache::Column::ExpiresAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await?;

            Ok::<_, CacheError>(())
        })
        .await
    }

    async fn invalidate_all(&self, prefix: &str) -> Result<u64, CacheError> {
        bounded(self.op_timeout, || CacheError::Timeout, async {
            let res = SearchCache::delete_many()
                .filter(search_cache::Column::CacheKey.starts_with(prefix))
                .exec(&self.conn)
                .await?;
            Ok::<_, CacheError>(res.rows_affected)
        })
        .await
    }
}
