//! In-memory collaborators with failure switches, shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use cinedex::models::movie::{MovieRecord, MovieStub};
use cinedex::services::{
    CacheError, CatalogStore, FieldWeight, IndexQueryError, MetadataProvider, ProviderError,
    ResultCache, SearchIndex, StoreError,
};
use tokio::sync::Notify;

pub fn movie(id: &str, title: &str, plot: &str) -> MovieRecord {
    MovieRecord {
        external_id: id.to_string(),
        title: title.to_string(),
        release_year: "2020".to_string(),
        director: Some("Jane Doe".to_string()),
        plot: Some(plot.to_string()),
        poster_url: None,
    }
}

pub fn stub(id: &str, title: &str) -> MovieStub {
    MovieStub {
        external_id: id.to_string(),
        title: title.to_string(),
        year: "2020".to_string(),
        kind: Some("movie".to_string()),
        poster_url: None,
    }
}

pub fn temp_db_url(prefix: &str) -> String {
    let path = std::env::temp_dir().join(format!("{prefix}-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}?mode=rwc", path.display())
}

/// Five space movies keyed `tt0000001`..`tt0000005`.
pub fn space_catalog() -> Vec<MovieRecord> {
    (1..=5)
        .map(|i| {
            movie(
                &format!("tt000000{i}"),
                &format!("Space Movie {i}"),
                "A crew travels far from home.",
            )
        })
        .collect()
}

#[derive(Default)]
pub struct FakeProvider {
    stubs: Vec<MovieStub>,
    details: HashMap<String, MovieRecord>,
    failing: HashSet<String>,
    list_fails: AtomicBool,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pause_on: Option<String>,
    pub paused: Notify,
    pub resume: Notify,
}

impl FakeProvider {
    /// Lists every record and knows the details of each.
    pub fn with_records(records: &[MovieRecord]) -> Self {
        Self {
            stubs: records
                .iter()
                .map(|r| stub(&r.external_id, &r.title))
                .collect(),
            details: records
                .iter()
                .map(|r| (r.external_id.clone(), r.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_details_for(mut self, external_id: &str) -> Self {
        self.failing.insert(external_id.to_string());
        self
    }

    /// Lists `external_id` without knowing its details.
    pub fn with_unknown(mut self, external_id: &str) -> Self {
        self.stubs.push(stub(external_id, "Ghost"));
        self
    }

    /// Blocks the detail lookup for `external_id` until `resume` is notified.
    pub fn pausing_on(mut self, external_id: &str) -> Self {
        self.pause_on = Some(external_id.to_string());
        self
    }

    pub fn set_list_fails(&self, fails: bool) {
        self.list_fails.store(fails, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FakeProvider {
    async fn list_by_query(&self, _term: &str, _year: &str) -> Result<Vec<MovieStub>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::Http { status: 503 });
        }
        Ok(self.stubs.clone())
    }

    async fn get_details(&self, external_id: &str) -> Result<Option<MovieRecord>, ProviderError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        if self.pause_on.as_deref() == Some(external_id) {
            self.paused.notify_one();
            self.resume.notified().await;
        }

        if self.failing.contains(external_id) {
            return Err(ProviderError::Timeout);
        }
        Ok(self.details.get(external_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub records: Mutex<HashMap<String, MovieRecord>>,
    pub upserts: AtomicUsize,
    failing_upserts: HashSet<String>,
}

impl FakeCatalog {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn failing_upsert_for(mut self, external_id: &str) -> Self {
        self.failing_upserts.insert(external_id.to_string());
        self
    }
}

#[async_trait::async_trait]
impl CatalogStore for FakeCatalog {
    async fn upsert(&self, record: &MovieRecord) -> Result<(), StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.failing_upserts.contains(&record.external_id) {
            return Err(StoreError::Database("disk I/O error".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.external_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, external_id: &str) -> Result<Option<MovieRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(external_id).cloned())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.len() as u64)
    }
}

/// Substring matcher: title hits rank ahead of other-field hits, then by id.
#[derive(Default)]
pub struct FakeIndex {
    pub documents: Mutex<HashMap<String, MovieRecord>>,
    pub query_fails: AtomicBool,
    pub query_calls: AtomicUsize,
    pub index_calls: AtomicUsize,
    failing_writes: HashSet<String>,
}

impl FakeIndex {
    pub fn failing_index_for(mut self, external_id: &str) -> Self {
        self.failing_writes.insert(external_id.to_string());
        self
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.documents.lock().unwrap().contains_key(external_id)
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn seed(&self, records: &[MovieRecord]) {
        let mut docs = self.documents.lock().unwrap();
        for r in records {
            docs.insert(r.external_id.clone(), r.clone());
        }
    }
}

#[async_trait::async_trait]
impl SearchIndex for FakeIndex {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn index_document(&self, key: &str, record: &MovieRecord) -> Result<(), StoreError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.contains(key) {
            return Err(StoreError::Index("shard unavailable".to_string()));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn query(
        &self,
        term: &str,
        _fields: &[FieldWeight],
    ) -> Result<Vec<MovieRecord>, IndexQueryError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.query_fails.load(Ordering::SeqCst) {
            return Err(IndexQueryError::Unavailable("connection refused".to_string()));
        }

        let docs = self.documents.lock().unwrap();
        let mut hits: Vec<(u8, MovieRecord)> = docs
            .values()
            .filter_map(|r| {
                let in_title = r.title.to_lowercase().contains(term);
                let elsewhere = [&r.director, &r.plot]
                    .iter()
                    .any(|f| f.as_deref().is_some_and(|v| v.to_lowercase().contains(term)));
                match (in_title, elsewhere) {
                    (true, _) => Some((0, r.clone())),
                    (false, true) => Some((1, r.clone())),
                    _ => None,
                }
            })
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.external_id.cmp(&b.1.external_id)));
        Ok(hits.into_iter().map(|(_, r)| r).collect())
    }
}

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, Vec<MovieRecord>>>,
    pub unavailable: AtomicBool,
    pub invalidations: AtomicUsize,
    pub last_ttl: Mutex<Option<Duration>>,
}

impl FakeCache {
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl ResultCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<MovieRecord>>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        records: &[MovieRecord],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.check()?;
        *self.last_ttl.lock().unwrap() = Some(ttl);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), records.to_vec());
        Ok(())
    }

    async fn invalidate_all(&self, prefix: &str) -> Result<u64, CacheError> {
        self.check()?;
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}
