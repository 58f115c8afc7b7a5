//! Boundary to the external movie-metadata provider.

use crate::models::movie::{MovieRecord, MovieStub};
use thiserror::Error;

/// Transport-level failures talking to the provider.
///
/// A "no results" answer is not an error; it surfaces as an empty listing or
/// `Ok(None)` from [`MetadataProvider::get_details`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Metadata provider timed out")]
    Timeout,

    #[error("Metadata provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("Metadata provider request failed: {0}")]
    Transport(String),

    #[error("Metadata provider returned an unreadable body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Paginated read access to the provider.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Lists every stub matching `term` released in `year`, across all pages,
    /// in page order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if any page fails to load.
    async fn list_by_query(&self, term: &str, year: &str) -> Result<Vec<MovieStub>, ProviderError>;

    /// Fetches the full record for `external_id`, or `None` if the provider does
    /// not know it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on timeout, non-2xx status or transport failure.
    async fn get_details(&self, external_id: &str) -> Result<Option<MovieRecord>, ProviderError>;
}
