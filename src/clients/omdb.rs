use futures::{StreamExt, TryStreamExt, stream};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::OmdbConfig;
use crate::models::movie::{MovieRecord, MovieStub};
use crate::services::metadata::{MetadataProvider, ProviderError};

/// The provider's placeholder for an absent value.
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbStub>,
    #[serde(rename = "totalResults", default)]
    total_results: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbStub {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

fn is_false(response: Option<&str>) -> bool {
    response.is_some_and(|r| r.eq_ignore_ascii_case("false"))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != NOT_AVAILABLE)
}

/// One page of a provider listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPage {
    pub items: Vec<MovieStub>,
    pub total_results: u64,
}

impl FetchPage {
    fn empty() -> Self {
        Self::default()
    }
}

/// Number of pages implied by `total_results` when each page holds `page_size`
/// items, capped at `max_pages`.
///
/// # Examples
///
/// ```
/// # use cinedex::clients::omdb::total_pages;
/// assert_eq!(total_pages(25, 10, 100), 3);
/// assert_eq!(total_pages(10, 10, 100), 1);
/// assert_eq!(total_pages(5000, 10, 100), 100);
/// ```
#[must_use]
pub fn total_pages(total_results: u64, page_size: usize, max_pages: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_results.div_ceil(page_size as u64);
    u32::try_from(pages)
        .unwrap_or(u32::MAX)
        .min(max_pages.max(1))
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_concurrency: usize,
    max_pages: u32,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Cinedex/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build OMDb HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &OmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            page_concurrency: config.page_concurrency.max(1),
            max_pages: config.max_pages,
        }
    }

    /// Fetches a single listing page. A "no results" answer yields an empty page.
    pub async fn fetch_page(
        &self,
        term: &str,
        year: &str,
        page: u32,
    ) -> Result<FetchPage, ProviderError> {
        let page_param = page.to_string();
        let mut params = vec![
            ("apikey", self.api_key.as_str()),
            ("s", term),
            ("page", page_param.as_str()),
        ];
        if !year.is_empty() {
            params.push(("y", year));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(page, status = status.as_u16(), "OMDb listing request failed");
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;

        if is_false(body.response.as_deref()) {
            debug!(
                page,
                reason = body.error.as_deref().unwrap_or("unspecified"),
                "OMDb reported no results"
            );
            return Ok(FetchPage::empty());
        }

        let total_results = body
            .total_results
            .as_deref()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0);

        let items = body
            .search
            .into_iter()
            .map(|s| MovieStub {
                external_id: s.imdb_id,
                title: s.title,
                year: s.year,
                kind: present(s.kind),
                poster_url: present(s.poster),
            })
            .collect();

        Ok(FetchPage {
            items,
            total_results,
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for OmdbClient {
    async fn list_by_query(&self, term: &str, year: &str) -> Result<Vec<MovieStub>, ProviderError> {
        let first = self.fetch_page(term, year, 1).await?;

        let page_size = first.items.len();
        let pages = total_pages(first.total_results, page_size, self.max_pages);

        debug!(
            term,
            year,
            total_results = first.total_results,
            page_size,
            pages,
            "OMDb listing first page loaded"
        );

        if pages <= 1 {
            return Ok(first.items);
        }

        // `buffered` keeps page order while up to `page_concurrency` requests run at once.
        let rest: Vec<FetchPage> = stream::iter(2..=pages)
            .map(|page| self.fetch_page(term, year, page))
            .buffered(self.page_concurrency)
            .try_collect()
            .await?;

        let mut items = first.items;
        for page in rest {
            items.extend(page.items);
        }

        Ok(items)
    }

    async fn get_details(&self, external_id: &str) -> Result<Option<MovieRecord>, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("i", external_id),
                ("plot", "full"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let details: DetailsResponse = response.json().await?;

        if is_false(details.response.as_deref()) {
            return Ok(None);
        }

        let title = present(details.title)
            .ok_or_else(|| ProviderError::Decode(format!("record {external_id} has no Title")))?;

        Ok(Some(MovieRecord {
            external_id: details.imdb_id.unwrap_or_else(|| external_id.to_string()),
            title,
            release_year: present(details.year).unwrap_or_default(),
            director: present(details.director),
            plot: present(details.plot),
            poster_url: present(details.poster),
        }))
    }
}
