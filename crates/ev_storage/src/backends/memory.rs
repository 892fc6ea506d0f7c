use async_trait::async_trait;
use ev_core::types::refreshed_timestamp;
use ev_core::{tags, Article, ArticleStorage, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::{check_article, StorageBackend, StorageConfig};

/// Rows in insertion order plus a url index into them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    index: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_overlapping(&self, query_tags: &[String]) -> Vec<Article> {
        if query_tags.is_empty() {
            return Vec::new();
        }
        self.articles.iter()
            .filter(|article| tags::overlaps(&article.tags, query_tags))
            .cloned()
            .collect()
    }

    /// Writes are staged on a copy so a rejected row leaves the store untouched.
    pub fn append(&mut self, batch: &[Article]) -> Result<usize> {
        let mut staged = Vec::new();
        let mut staged_urls = std::collections::HashSet::new();
        for article in batch {
            check_article(article)?;
            if self.index.contains_key(&article.url) || !staged_urls.insert(article.url.clone()) {
                continue;
            }
            staged.push(article.clone());
        }
        let inserted = staged.len();
        for article in staged {
            self.index.insert(article.url.clone(), self.articles.len());
            self.articles.push(article);
        }
        Ok(inserted)
    }

    pub fn upsert(&mut self, batch: &[Article]) -> Result<usize> {
        for article in batch {
            check_article(article)?;
        }
        for article in batch {
            match self.index.get(&article.url) {
                Some(&pos) => {
                    let existing = &mut self.articles[pos];
                    let stamp = refreshed_timestamp(Some(existing.retrieval_timestamp));
                    *existing = Article { retrieval_timestamp: stamp, ..article.clone() };
                }
                None => {
                    let stamp = refreshed_timestamp(None);
                    self.index.insert(article.url.clone(), self.articles.len());
                    self.articles.push(Article { retrieval_timestamp: stamp, ..article.clone() });
                }
            }
        }
        Ok(batch.len())
    }

    pub fn get(&self, url: &str) -> Option<&Article> {
        self.index.get(url).map(|&pos| &self.articles[pos])
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new(_config: &StorageConfig) -> Result<Self> {
        Ok(Self::empty())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn find_overlapping(&self, tags: &[String]) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.find_overlapping(tags))
    }

    async fn append_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut store = self.store.write().await;
        store.append(articles)
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut store = self.store.write().await;
        store.upsert(articles)
    }

    async fn contains(&self, url: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.get(url).is_some())
    }

    async fn get_article(&self, url: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get(url).cloned())
    }

    async fn count(&self) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn article(url: &str, summary: &str, t: &[&str]) -> Article {
        Article::new(url, summary, "tariff news", tags(t))
    }

    #[tokio::test]
    async fn test_find_overlapping() {
        let storage = InMemoryStorage::empty();
        storage.append_articles(&[
            article("https://a.example/1", "one", &["tariff", "trump"]),
            article("https://a.example/2", "two", &["china"]),
            article("https://a.example/3", "three", &["trump"]),
        ]).await.unwrap();

        let found = storage.find_overlapping(&tags(&["trump", "tariff"])).await.unwrap();
        let urls: Vec<_> = found.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/3"]);

        assert!(storage.find_overlapping(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_is_insert_or_skip() {
        let storage = InMemoryStorage::empty();
        let first = article("https://a.example/1", "curated", &["tariff"]);
        assert_eq!(storage.append_articles(&[first.clone()]).await.unwrap(), 1);

        let second = article("https://a.example/1", "low confidence", &["other"]);
        assert_eq!(storage.append_articles(&[second]).await.unwrap(), 0);

        let stored = storage.get_article("https://a.example/1").await.unwrap().unwrap();
        assert_eq!(stored, first);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_is_insert_or_update() {
        let storage = InMemoryStorage::empty();
        storage.store_articles(&[article("https://a.example/1", "old", &["tariff"])]).await.unwrap();
        let before = storage.get_article("https://a.example/1").await.unwrap().unwrap();

        storage.store_articles(&[article("https://a.example/1", "new", &["china", "trade"])]).await.unwrap();
        let after = storage.get_article("https://a.example/1").await.unwrap().unwrap();

        assert_eq!(after.summary, "new");
        assert_eq!(after.tags, tags(&["china", "trade"]));
        assert!(after.retrieval_timestamp > before.retrieval_timestamp);
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_writes_nothing() {
        let storage = InMemoryStorage::empty();
        let result = storage.append_articles(&[
            article("https://a.example/1", "fine", &["tariff"]),
            article("", "no url", &["tariff"]),
        ]).await;
        assert!(result.is_err());
        assert_eq!(storage.count().await.unwrap(), 0);
        assert!(!storage.contains("https://a.example/1").await.unwrap());
    }
}
