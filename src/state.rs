use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

use crate::clients::elasticsearch::ElasticsearchIndex;
use crate::clients::omdb::OmdbClient;
use crate::config::{Config, SearchBackend};
use crate::db::Store;
use crate::services::{
    CatalogStore, IngestionJob, MetadataProvider, ResultCache, SearchIndex, SearchService,
};

/// Shared HTTP client for provider calls, reused for connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Cinedex/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub catalog: Arc<dyn CatalogStore>,

    pub index: Arc<dyn SearchIndex>,

    pub cache: Arc<dyn ResultCache>,

    pub provider: Arc<dyn MetadataProvider>,

    pub search_service: Arc<SearchService>,

    pub ingestion: Arc<IngestionJob>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;

        let http_client = build_shared_http_client(config.omdb.request_timeout_seconds)?;
        let provider: Arc<dyn MetadataProvider> =
            Arc::new(OmdbClient::with_shared_client(http_client, &config.omdb));

        let index: Arc<dyn SearchIndex> = match config.search_index.backend {
            SearchBackend::Sqlite => Arc::new(store.search_index(config.search_index.max_results)),
            SearchBackend::Elasticsearch => {
                Arc::new(ElasticsearchIndex::new(&config.search_index)?)
            }
        };
        info!(backend = ?config.search_index.backend, "Search index backend selected");

        let cache: Arc<dyn ResultCache> = Arc::new(store.result_cache());

        Self::from_parts(config, store, provider, index, cache).await
    }

    /// Wires the services around explicit collaborators. The catalog is always
    /// `store`.
    pub async fn from_parts(
        config: Config,
        store: Store,
        provider: Arc<dyn MetadataProvider>,
        index: Arc<dyn SearchIndex>,
        cache: Arc<dyn ResultCache>,
    ) -> anyhow::Result<Self> {
        index
            .ensure_schema()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to prepare search index: {e}"))?;

        let catalog: Arc<dyn CatalogStore> = Arc::new(store.clone());

        let search_service = Arc::new(SearchService::new(
            Arc::clone(&index),
            Arc::clone(&cache),
            Duration::from_secs(config.cache.ttl_seconds),
        ));

        let ingestion = Arc::new(IngestionJob::new(
            Arc::clone(&provider),
            Arc::clone(&catalog),
            Arc::clone(&index),
            Arc::clone(&cache),
            &config.ingestion,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            catalog,
            index,
            cache,
            provider,
            search_service,
            ingestion,
        })
    }
}
