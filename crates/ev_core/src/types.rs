use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::tags::normalize_tags;
use crate::{Error, Result};

/// Prefixes the fetcher writes in place of real content when a URL fails.
pub const FETCH_ERROR_PREFIX: &str = "Error:";
pub const SUMMARY_FAILED_PREFIX: &str = "Summarization failed:";
pub const SUMMARY_RETRIES_EXCEEDED: &str = "Summary error: Maximum retries exceeded";

/// A cached piece of evidence. `url` is the identity; everything else is
/// replaced wholesale by an upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub summary: String,
    pub query: String,
    pub tags: Vec<String>,
    pub retrieval_timestamp: DateTime<Utc>,
}

impl Article {
    pub fn new(url: impl Into<String>, summary: impl Into<String>, query: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            url: url.into(),
            summary: summary.into(),
            query: query.into(),
            tags,
            retrieval_timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    /// Number of distinct tags this article shares with `tags`.
    pub fn shared_tag_count(&self, tags: &[String]) -> usize {
        crate::tags::shared_count(&self.tags, tags)
    }
}

/// What the fetcher hands back for one URL. `query` and `tags` are only
/// present when the caller supplied pre-tagged data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedArticle {
    pub url: String,
    pub raw_content: String,
    pub summary: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FetchedArticle {
    pub fn new(url: impl Into<String>, raw_content: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_content: raw_content.into(),
            summary: summary.into(),
            query: None,
            tags: Vec::new(),
        }
    }

    /// True when the summary is one of the in-band failure markers.
    pub fn is_error_marker(&self) -> bool {
        let summary = self.summary.trim_start();
        summary.starts_with(FETCH_ERROR_PREFIX)
            || summary.starts_with(SUMMARY_FAILED_PREFIX)
            || summary.starts_with(SUMMARY_RETRIES_EXCEEDED)
    }

    /// Fills a missing query or tag set from the triggering request.
    /// Supplied tags are normalized so they match later lookups.
    pub fn into_article(self, query: &str, tags: &[String]) -> Article {
        let query = match self.query {
            Some(q) if !q.is_empty() => q,
            _ => query.to_string(),
        };
        let supplied = normalize_tags(&self.tags);
        let tags = if supplied.is_empty() { tags.to_vec() } else { supplied };
        Article::new(self.url, self.summary, query, tags)
    }
}

/// Either discover sources for a query or process an explicit URL list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FetchRequest {
    Query { query: String, count: usize },
    Urls { urls: Vec<String> },
}

impl FetchRequest {
    pub fn query(query: impl Into<String>, count: usize) -> Self {
        Self::Query { query: query.into(), count }
    }

    pub fn urls(urls: Vec<String>) -> Self {
        Self::Urls { urls }
    }

    /// Rejects a request that is missing the parameter its mode needs.
    pub fn validate(&self) -> Result<()> {
        match self {
            FetchRequest::Query { query, .. } if query.trim().is_empty() => {
                Err(Error::Config("query must be provided when mode is 'query'".to_string()))
            }
            FetchRequest::Urls { urls } if urls.is_empty() => {
                Err(Error::Config("url list must be provided when mode is 'urls'".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// A timestamp strictly later than `previous`, so refreshed rows always
/// move forward even when the clock has not. Microsecond precision matches
/// what the SQLite backend persists.
pub fn refreshed_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}
