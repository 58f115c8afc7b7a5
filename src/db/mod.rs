use crate::config::DatabaseConfig;
use crate::models::movie::MovieRecord;
use crate::services::catalog::{CatalogStore, StoreError};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::cache::SqliteResultCache;
pub use repositories::search_index::SqliteSearchIndex;

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs `fut`, mapping an elapsed deadline to `on_timeout()`.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    on_timeout: impl FnOnce() -> E,
    fut: F,
) -> std::result::Result<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(on_timeout()))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    op_timeout: Duration,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, DEFAULT_OPERATION_TIMEOUT).await
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::with_pool_options(
            &config.url,
            config.max_connections,
            config.min_connections,
            Duration::from_secs(config.operation_timeout_seconds),
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        op_timeout: Duration,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, op_timeout })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn result_cache(&self) -> SqliteResultCache {
        SqliteResultCache::new(self.conn.clone(), self.op_timeout)
    }

    #[must_use]
    pub fn search_index(&self, max_results: usize) -> SqliteSearchIndex {
        SqliteSearchIndex::new(self.conn.clone(), self.op_timeout, max_results)
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }
}

#[async_trait::async_trait]
impl CatalogStore for Store {
    async fn upsert(&self, record: &MovieRecord) -> std::result::Result<(), StoreError> {
        bounded(self.op_timeout, || StoreError::Timeout, async {
            self.movie_repo().upsert(record).await.map_err(StoreError::from)
        })
        .await
    }

    async fn get(&self, external_id: &str) -> std::result::Result<Option<MovieRecord>, StoreError> {
        bounded(self.op_timeout, || StoreError::Timeout, async {
            self.movie_repo()
                .get(external_id)
                .await
                .map_err(StoreError::from)
        })
        .await
    }

    async fn count(&self) -> std::result::Result<u64, StoreError> {
        bounded(self.op_timeout, || StoreError::Timeout, async {
            self.movie_repo().count().await.map_err(StoreError::from)
        })
        .await
    }
}
