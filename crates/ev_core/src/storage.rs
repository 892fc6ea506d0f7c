use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// The Evidence Store. Writes come in two flavours so callers state intent:
/// `append_articles` never clobbers an existing row, `store_articles` always does.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Coarse lookup: every article sharing at least one tag with `tags`.
    async fn find_overlapping(&self, tags: &[String]) -> Result<Vec<Article>>;

    /// Insert-or-skip. The whole batch commits or none of it does.
    /// Returns how many rows were actually inserted.
    async fn append_articles(&self, articles: &[Article]) -> Result<usize>;

    /// Insert-or-update. Refreshes `retrieval_timestamp` on every row written.
    async fn store_articles(&self, articles: &[Article]) -> Result<usize>;

    /// Whether an article with this URL is already cached
    async fn contains(&self, url: &str) -> Result<bool>;

    async fn get_article(&self, url: &str) -> Result<Option<Article>>;

    async fn count(&self) -> Result<usize>;
}
