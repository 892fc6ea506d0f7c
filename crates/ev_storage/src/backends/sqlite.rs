use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ev_core::types::refreshed_timestamp;
use ev_core::{Article, ArticleStorage, Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use crate::{check_article, StorageBackend, StorageConfig};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT PRIMARY KEY,
        summary TEXT NOT NULL,
        query TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        retrieval_timestamp TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

const SELECT_COLUMNS: &str = "SELECT url, summary, query, tags, retrieval_timestamp FROM articles";

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available"
    }

    async fn new(config: &StorageConfig) -> Result<Self> {
        Self::new_with_path(&config.db_path()).await
    }
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

/// Fixed-width so lexical order in SQLite matches chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date: {}", e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let tags: String = row.get("tags");
    Ok(Article {
        url: row.get("url"),
        summary: row.get("summary"),
        query: row.get("query"),
        tags: serde_json::from_str(&tags)?,
        retrieval_timestamp: parse_timestamp(&row.get::<String, _>("retrieval_timestamp"))?,
    })
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
            .map_err(db_error("Invalid database path"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn find_overlapping(&self, tags: &[String]) -> Result<Vec<Article>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        let wanted = serde_json::to_string(tags)?;
        let rows = sqlx::query(&format!(
            r#"
            {SELECT_COLUMNS}
            WHERE EXISTS (
                SELECT 1 FROM json_each(articles.tags) AS t
                WHERE t.value IN (SELECT value FROM json_each(?))
            )
            ORDER BY retrieval_timestamp ASC, url ASC
            "#
        ))
        .bind(wanted)
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error("Failed to query articles by tags"))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn append_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to open transaction"))?;
        let mut inserted = 0;
        for article in articles {
            // An early return drops `tx`, which rolls the whole batch back.
            check_article(article)?;
            let result = sqlx::query(
                r#"
                INSERT INTO articles (url, summary, query, tags, retrieval_timestamp)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(url) DO NOTHING
                "#,
            )
            .bind(&article.url)
            .bind(&article.summary)
            .bind(&article.query)
            .bind(serde_json::to_string(&article.tags)?)
            .bind(format_timestamp(&article.retrieval_timestamp))
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to append article"))?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await.map_err(db_error("Failed to commit appended articles"))?;
        Ok(inserted)
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to open transaction"))?;
        for article in articles {
            check_article(article)?;
            let previous: Option<String> =
                sqlx::query_scalar("SELECT retrieval_timestamp FROM articles WHERE url = ?")
                    .bind(&article.url)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_error("Failed to read existing article"))?;
            let previous = previous.as_deref().map(parse_timestamp).transpose()?;

            sqlx::query(
                r#"
                INSERT INTO articles (url, summary, query, tags, retrieval_timestamp)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(url) DO UPDATE SET
                    summary = excluded.summary,
                    query = excluded.query,
                    tags = excluded.tags,
                    retrieval_timestamp = excluded.retrieval_timestamp
                "#,
            )
            .bind(&article.url)
            .bind(&article.summary)
            .bind(&article.query)
            .bind(serde_json::to_string(&article.tags)?)
            .bind(format_timestamp(&refreshed_timestamp(previous)))
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store article"))?;
        }
        tx.commit().await.map_err(db_error("Failed to commit stored articles"))?;
        Ok(articles.len())
    }

    async fn contains(&self, url: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to check for duplicate"))?;
        Ok(found.is_some())
    }

    async fn get_article(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE url = ?"))
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error("Failed to get article"))?;
        row.as_ref().map(row_to_article).transpose()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(db_error("Failed to count articles"))?;
        Ok(count as usize)
    }
}
