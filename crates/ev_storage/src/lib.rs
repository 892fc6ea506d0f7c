use async_trait::async_trait;
use ev_core::{Article, ArticleStorage, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_DB_PATH: &str = "articles.db";

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new(config: &StorageConfig) -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}'. Available backends: memory, sqlite",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn new(kind: StorageKind) -> Self {
        Self { kind, path: None }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}

async fn open<T: StorageBackend + ArticleStorage + 'static>(config: &StorageConfig) -> Result<Arc<dyn ArticleStorage>> {
    match T::new(config).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) if e.is_config() => Err(e),
        Err(e) => Err(Error::Storage(format!("{} ({})", T::get_error_message(), e))),
    }
}

pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn ArticleStorage>> {
    tracing::debug!("Opening {} storage", config.kind);
    match config.kind {
        StorageKind::Memory => open::<InMemoryStorage>(config).await,
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => open::<SQLiteStorage>(config).await,
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => Err(Error::Config(
            "this build has no sqlite support; enable the `sqlite` feature".to_string(),
        )),
    }
}

/// Rejects a row that cannot be keyed. Backends call this per row so a bad
/// row aborts the whole batch.
pub(crate) fn check_article(article: &Article) -> Result<()> {
    if article.url.trim().is_empty() {
        return Err(Error::Storage("article url must not be empty".to_string()));
    }
    Ok(())
}

pub mod prelude {
    pub use super::{create_storage, StorageBackend, StorageConfig, StorageKind};
    pub use super::backends::*;
}
