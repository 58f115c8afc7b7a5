use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::models::movie::MovieRecord;
use crate::services::catalog::{FieldWeight, IndexQueryError, SearchIndex, StoreError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: MovieRecord,
}

/// `multi_match` field list with boosts, e.g. `title^2`.
fn boosted_fields(fields: &[FieldWeight]) -> Vec<String> {
    fields
        .iter()
        .map(|f| format!("{}^{}", f.field, f.weight))
        .collect()
}

fn index_body() -> serde_json::Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    "movie_analyzer": {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "stop", "snowball"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "title": { "type": "text", "analyzer": "movie_analyzer" },
                "director": { "type": "text", "analyzer": "movie_analyzer" },
                "plot": { "type": "text", "analyzer": "movie_analyzer" },
                "release_year": { "type": "keyword", "index": false },
                "poster_url": { "type": "keyword", "index": false },
                "external_id": { "type": "keyword" }
            }
        }
    })
}

fn write_error(err: &reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Index(err.to_string())
    }
}

fn read_error(err: &reqwest::Error) -> IndexQueryError {
    if err.is_timeout() {
        IndexQueryError::Timeout
    } else if err.is_decode() {
        IndexQueryError::Decode(err.to_string())
    } else {
        IndexQueryError::Unavailable(err.to_string())
    }
}

/// Search index backed by an Elasticsearch cluster over its REST API.
pub struct ElasticsearchIndex {
    client: Client,
    nodes: Vec<Url>,
    index: String,
    max_results: usize,
    next_node: AtomicUsize,
}

impl ElasticsearchIndex {
    pub fn new(config: &SearchIndexConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build Elasticsearch HTTP client: {e}"))?;

        let nodes = config
            .nodes
            .iter()
            .map(|n| Url::parse(n).map_err(|e| anyhow::anyhow!("Invalid Elasticsearch node {n}: {e}")))
            .collect::<anyhow::Result<Vec<_>>>()?;

        if nodes.is_empty() {
            anyhow::bail!("At least one Elasticsearch node is required");
        }

        Ok(Self {
            client,
            nodes,
            index: config.index_name.clone(),
            max_results: config.max_results,
            next_node: AtomicUsize::new(0),
        })
    }

    /// Builds `{node}/{index}/{segments...}`, rotating across nodes per call.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let i = self.next_node.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        let mut url = self.nodes[i].clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(&self.index).extend(segments);
        }
        url
    }

    async fn create_index(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.endpoint(&[]))
            .json(&index_body())
            .send()
            .await
            .map_err(|e| write_error(&e))?;

        let status = response.status();
        if status.is_success() {
            info!(index = %self.index, "Elasticsearch index created");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST && body.contains("resource_already_exists_exception")
        {
            debug!(index = %self.index, "Elasticsearch index already exists");
            return Ok(());
        }

        Err(StoreError::Index(format!(
            "creating index {} failed: {} - {}",
            self.index, status, body
        )))
    }
}

#[async_trait::async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .head(self.endpoint(&[]))
            .send()
            .await
            .map_err(|e| write_error(&e))?;

        match response.status() {
            s if s.is_success() => {
                info!(index = %self.index, "Elasticsearch index already exists, skipping creation");
                Ok(())
            }
            StatusCode::NOT_FOUND => self.create_index().await,
            s => Err(StoreError::Index(format!(
                "checking index {} returned {}",
                self.index, s
            ))),
        }
    }

    async fn index_document(&self, key: &str, record: &MovieRecord) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.endpoint(&["_doc", key]))
            .json(record)
            .send()
            .await
            .map_err(|e| write_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Index(format!(
                "indexing {key} failed: {status} - {body}"
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        term: &str,
        fields: &[FieldWeight],
    ) -> Result<Vec<MovieRecord>, IndexQueryError> {
        let body = json!({
            "size": self.max_results,
            "query": {
                "multi_match": {
                    "query": term,
                    "fields": boosted_fields(fields)
                }
            }
        });

        let response = self
            .client
            .post(self.endpoint(&["_search"]))
            .json(&body)
            .send()
            .await
            .map_err(|e| read_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexQueryError::Unavailable(format!(
                "search on {} returned {}",
                self.index, status
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| read_error(&e))?;

        Ok(parsed.hits.hits.into_iter().map(|h| h.source).collect())
    }
}
