//! Domain primitives shared by the ingestion and search flows.
//!
//! Provides the normalized search query newtype and the provenance tag attached
//! to every search answer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized free-text search query.
///
/// Normalization lowercases the input and trims surrounding whitespace, so two
/// raw queries that differ only in case or padding map to the same value.
///
/// # Examples
///
/// ```rust
/// use cinedex::domain::SearchQuery;
///
/// let q = SearchQuery::parse("  Space Odyssey ").unwrap();
/// assert_eq!(q.as_str(), "space odyssey");
/// assert!(SearchQuery::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Normalizes `raw`. Returns `None` when nothing is left after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_query(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure normalization rule: lowercase, then trim leading/trailing whitespace.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

/// Where a search answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Index,
}

impl Provenance {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_case_and_padding_insensitive() {
        let a = SearchQuery::parse("SPACE").unwrap();
        let b = SearchQuery::parse("  space\t").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn inner_whitespace_is_preserved() {
        let q = SearchQuery::parse(" Deep  Space ").unwrap();
        assert_eq!(q.as_str(), "deep  space");
    }

    #[test]
    fn blank_query_is_rejected() {
        assert!(SearchQuery::parse("").is_none());
        assert!(SearchQuery::parse(" \n ").is_none());
    }

    #[test]
    fn provenance_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provenance::Cache).unwrap(),
            "\"cache\""
        );
        assert_eq!(Provenance::Index.to_string(), "index");
    }
}
