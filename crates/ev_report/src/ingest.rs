use ev_core::tags::normalize_tags;
use ev_core::{Article, ArticleStorage, Result};
use serde::{Deserialize, Serialize};

use crate::supplement::is_well_formed_url;

/// A pre-summarized article handed in by an operator, e.g. from a JSON file
/// or the `POST /api/articles` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<ArticleRecord> for Article {
    fn from(record: ArticleRecord) -> Self {
        Article::new(record.url, record.summary, record.query, normalize_tags(&record.tags))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    /// Rows written, new or refreshed.
    pub stored: usize,
    /// Rows that already existed and were overwritten.
    pub refreshed: usize,
    /// Records dropped for a malformed URL.
    pub skipped: usize,
}

/// The store/refresh path: existing rows are overwritten and their
/// timestamps refreshed. Records with malformed URLs are dropped.
pub async fn store_records(storage: &dyn ArticleStorage, records: Vec<ArticleRecord>) -> Result<StoreOutcome> {
    let total = records.len();
    let articles: Vec<Article> = records
        .into_iter()
        .filter(|record| is_well_formed_url(&record.url))
        .map(Article::from)
        .collect();
    let mut outcome = StoreOutcome { skipped: total - articles.len(), ..StoreOutcome::default() };
    if outcome.skipped > 0 {
        tracing::warn!("Skipped {} record(s) with malformed URLs", outcome.skipped);
    }
    if articles.is_empty() {
        return Ok(outcome);
    }
    for article in &articles {
        if storage.contains(&article.url).await? {
            outcome.refreshed += 1;
        }
    }
    outcome.stored = storage.store_articles(&articles).await?;
    tracing::info!("Stored {} article(s), {} refreshed", outcome.stored, outcome.refreshed);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parsing_normalizes_tags() {
        let record: ArticleRecord = serde_json::from_str(
            r#"{"url": "https://a.example/1", "summary": "s", "tags": [" Tariff", "TRUMP", "tariff"]}"#,
        )
        .unwrap();
        let article = Article::from(record);
        assert_eq!(article.query, "");
        assert_eq!(article.tags, vec!["tariff".to_string(), "trump".to_string()]);
    }
}
