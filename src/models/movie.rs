use serde::{Deserialize, Serialize};

/// Canonical catalog entry. `external_id` is the provider's stable identifier
/// and the only key used by the catalog, the search index and the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub external_id: String,
    pub title: String,
    pub release_year: String,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

/// Entry from a provider listing; only the id is needed to fetch details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieStub {
    pub external_id: String,
    pub title: String,
    pub year: String,
    pub kind: Option<String>,
    pub poster_url: Option<String>,
}
