mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use cinedex::config::IngestionConfig;
use cinedex::domain::Provenance;
use cinedex::services::{IngestionJob, SearchError, SearchService};
use common::{FakeCache, FakeCatalog, FakeIndex, FakeProvider, movie, space_catalog};

const TTL: Duration = Duration::from_secs(864_000);

fn service() -> (SearchService, Arc<FakeIndex>, Arc<FakeCache>) {
    let index = Arc::new(FakeIndex::default());
    let cache = Arc::new(FakeCache::default());
    let service = SearchService::new(index.clone(), cache.clone(), TTL);
    (service, index, cache)
}

#[tokio::test]
async fn test_repeat_search_is_served_from_cache() {
    let (service, index, cache) = service();
    index.seed(&space_catalog());

    let first = service.search("Space").await.unwrap();
    let second = service.search("  space ").await.unwrap();

    assert_eq!(first.source, Provenance::Index);
    assert_eq!(second.source, Provenance::Cache);
    assert_eq!(first.results, second.results);
    assert_eq!(index.query_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*cache.last_ttl.lock().unwrap(), Some(TTL));
}

#[tokio::test]
async fn test_title_matches_rank_first() {
    let (service, index, _cache) = service();
    index.seed(&[
        movie("tt1", "Gravity", "Lost in space after debris strikes."),
        movie("tt2", "Space Sweepers", "Debris collectors find a child."),
    ]);

    let outcome = service.search("space").await.unwrap();

    let ids: Vec<&str> = outcome.results.iter().map(|r| r.external_id.as_str()).collect();
    assert_eq!(ids, vec!["tt2", "tt1"]);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let (service, index, _cache) = service();

    let first = service.search("nothing").await.unwrap();
    let second = service.search("nothing").await.unwrap();

    assert!(first.results.is_empty());
    assert_eq!(second.source, Provenance::Cache);
    assert_eq!(index.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_cache_falls_back_to_index() {
    let (service, index, cache) = service();
    index.seed(&space_catalog());
    cache.unavailable.store(true, Ordering::SeqCst);

    let first = service.search("space").await.unwrap();
    let second = service.search("space").await.unwrap();

    assert_eq!(first.source, Provenance::Index);
    assert_eq!(second.source, Provenance::Index);
    assert_eq!(first.results.len(), 5);
    assert_eq!(index.query_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_index_failure_surfaces_and_is_not_cached() {
    let (service, index, cache) = service();
    index.query_fails.store(true, Ordering::SeqCst);

    let err = service.search("space").await.unwrap_err();

    assert!(matches!(err, SearchError::Index(_)));
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_blank_query_is_rejected_before_any_lookup() {
    let (service, index, _cache) = service();

    let err = service.search("   ").await.unwrap_err();

    assert!(matches!(err, SearchError::EmptyQuery));
    assert_eq!(index.query_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_sees_fresh_data_after_ingestion() {
    let index = Arc::new(FakeIndex::default());
    let cache = Arc::new(FakeCache::default());
    let catalog = Arc::new(FakeCatalog::default());
    let service = SearchService::new(index.clone(), cache.clone(), TTL);

    let before = service.search("space").await.unwrap();
    assert!(before.results.is_empty());

    let job = IngestionJob::new(
        Arc::new(FakeProvider::with_records(&space_catalog())),
        catalog,
        index.clone(),
        cache.clone(),
        &IngestionConfig::default(),
    );
    job.run().await.unwrap();

    let after = service.search("space").await.unwrap();
    assert_eq!(after.source, Provenance::Index);
    assert_eq!(after.results.len(), 5);
}
