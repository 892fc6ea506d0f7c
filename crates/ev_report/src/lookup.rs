use ev_core::{Article, ArticleStorage};

/// Cached articles sharing at least `min_matches` tags with `tags`.
///
/// The store only narrows by any-overlap; the exact threshold is applied
/// here. A failing store reads as an empty one. `min_matches` below 1 is
/// treated as 1 since the store never returns non-overlapping rows.
pub async fn query_by_tags(storage: &dyn ArticleStorage, tags: &[String], min_matches: usize) -> Vec<Article> {
    let min_matches = min_matches.max(1);
    let rows = match storage.find_overlapping(tags).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Error querying database by tags: {}", e);
            return Vec::new();
        }
    };
    rows.into_iter()
        .filter(|article| article.shared_tag_count(tags) >= min_matches)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ev_core::{Error, Result};

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    /// Returns every row regardless of the query, like a sloppy index would.
    struct CoarseStore(Vec<Article>);

    #[async_trait]
    impl ArticleStorage for CoarseStore {
        async fn find_overlapping(&self, _tags: &[String]) -> Result<Vec<Article>> {
            Ok(self.0.clone())
        }
        async fn append_articles(&self, _articles: &[Article]) -> Result<usize> {
            Ok(0)
        }
        async fn store_articles(&self, _articles: &[Article]) -> Result<usize> {
            Ok(0)
        }
        async fn contains(&self, _url: &str) -> Result<bool> {
            Ok(false)
        }
        async fn get_article(&self, _url: &str) -> Result<Option<Article>> {
            Ok(None)
        }
        async fn count(&self) -> Result<usize> {
            Ok(self.0.len())
        }
    }

    struct DownStore;

    #[async_trait]
    impl ArticleStorage for DownStore {
        async fn find_overlapping(&self, _tags: &[String]) -> Result<Vec<Article>> {
            Err(Error::Database("connection refused".to_string()))
        }
        async fn append_articles(&self, _articles: &[Article]) -> Result<usize> {
            Err(Error::Database("connection refused".to_string()))
        }
        async fn store_articles(&self, _articles: &[Article]) -> Result<usize> {
            Err(Error::Database("connection refused".to_string()))
        }
        async fn contains(&self, _url: &str) -> Result<bool> {
            Err(Error::Database("connection refused".to_string()))
        }
        async fn get_article(&self, _url: &str) -> Result<Option<Article>> {
            Err(Error::Database("connection refused".to_string()))
        }
        async fn count(&self) -> Result<usize> {
            Err(Error::Database("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_exact_count_recheck() {
        let store = CoarseStore(vec![
            Article::new("https://a.example/1", "s", "q", tags(&["tariff", "trump", "china"])),
            Article::new("https://a.example/2", "s", "q", tags(&["tariff"])),
            Article::new("https://a.example/3", "s", "q", tags(&["weather"])),
            Article::new("https://a.example/4", "s", "q", tags(&["trump", "trump", "tariff"])),
        ]);
        let query = tags(&["tariff", "trump"]);

        let found = query_by_tags(&store, &query, 2).await;
        let urls: Vec<_> = found.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/4"]);

        let found = query_by_tags(&store, &query, 0).await;
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_store_failure_reads_as_empty() {
        assert!(query_by_tags(&DownStore, &tags(&["tariff"]), 1).await.is_empty());
    }
}
