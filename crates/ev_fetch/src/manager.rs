use std::sync::Arc;
use async_trait::async_trait;
use ev_core::types::FETCH_ERROR_PREFIX;
use ev_core::{FetchRequest, FetchedArticle, Fetcher, InferenceModel, Logger, Result};
use crate::config::FetchConfig;
use crate::reader::{ContentReader, ReaderClient};
use crate::search::{discover_urls, DuckDuckGoSearch, SearchProvider};
use crate::summarize::summarize_content;

/// Search, read and summarize, one URL at a time.
pub struct EvidenceFetcher {
    search: Arc<dyn SearchProvider>,
    reader: Arc<dyn ContentReader>,
    inference: Arc<dyn InferenceModel>,
    config: FetchConfig,
}

impl EvidenceFetcher {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        reader: Arc<dyn ContentReader>,
        inference: Arc<dyn InferenceModel>,
        config: FetchConfig,
    ) -> Self {
        Self { search, reader, inference, config }
    }

    /// Live search and reader backends configured from `config`.
    pub fn with_defaults(inference: Arc<dyn InferenceModel>, config: FetchConfig) -> Self {
        let search = Arc::new(DuckDuckGoSearch::new(&config));
        let reader = Arc::new(ReaderClient::new(&config));
        Self::new(search, reader, inference, config)
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn resolve_urls(&self, request: &FetchRequest) -> Result<Vec<String>> {
        match request {
            FetchRequest::Query { query, count } => {
                discover_urls(self.search.as_ref(), &self.config, query, *count).await
            }
            FetchRequest::Urls { urls } => Ok(urls.clone()),
        }
    }

    async fn fetch_one(&self, url: String, logger: &Logger) -> FetchedArticle {
        let raw_content = match self.reader.read(&url).await {
            Ok(content) => content,
            Err(e) => {
                logger.error(&format!("Error processing {}: {}", url, e));
                format!("{} {}", FETCH_ERROR_PREFIX, e)
            }
        };
        let summary = summarize_content(self.inference.as_ref(), &raw_content, &self.config).await;
        FetchedArticle::new(url, raw_content, summary)
    }
}

#[async_trait]
impl Fetcher for EvidenceFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<FetchedArticle>> {
        request.validate()?;
        let logger = Logger::new().with_prefix("[fetch]");

        let urls = self.resolve_urls(request).await?;
        if urls.is_empty() {
            logger.warn("No URLs to fetch");
            return Ok(Vec::new());
        }
        logger.info(&format!("Fetching {} URLs", urls.len()));

        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.fetch_one(url, &logger).await);
        }
        logger.info(&format!("Retrieved and summarized {} results", results.len()));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_core::{Error, GenerationRequest};
    use std::collections::HashMap;

    struct StaticSearch(Vec<String>);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        fn name(&self) -> &str {
            "static"
        }

        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<String>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct MapReader(HashMap<String, String>);

    #[async_trait]
    impl ContentReader for MapReader {
        async fn read(&self, url: &str) -> Result<String> {
            self.0.get(url)
                .cloned()
                .ok_or_else(|| Error::Fetch(format!("API Error: 404 - {}", url)))
        }
    }

    struct EchoModel;

    #[async_trait]
    impl InferenceModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            Ok(request.prompt.clone())
        }

        async fn summarize(&self, text: &str) -> Result<String> {
            Ok(format!("summary of {} chars", text.len()))
        }
    }

    fn fetcher(search: Vec<&str>, pages: &[(&str, &str)]) -> EvidenceFetcher {
        let pages = pages.iter().map(|(u, c)| (u.to_string(), c.to_string())).collect();
        EvidenceFetcher::new(
            Arc::new(StaticSearch(search.into_iter().map(String::from).collect())),
            Arc::new(MapReader(pages)),
            Arc::new(EchoModel),
            FetchConfig::default(),
        )
    }

    const BODY: &str = "Steel tariffs rose to twenty five percent in March, prompting retaliation.";

    #[tokio::test]
    async fn test_query_mode() {
        let fetcher = fetcher(
            vec!["https://youtu.be/x", "https://a.example/1", "https://a.example/2"],
            &[("https://a.example/1", BODY), ("https://a.example/2", BODY)],
        );
        let results = fetcher.fetch(&FetchRequest::query("steel tariffs", 5)).await.unwrap();
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/1", "https://a.example/2"]);
        assert!(results.iter().all(|r| r.summary.starts_with("summary of")));
        assert!(results.iter().all(|r| r.query.is_none() && r.tags.is_empty()));
    }

    #[tokio::test]
    async fn test_url_failures_stay_in_band() {
        let fetcher = fetcher(vec![], &[("https://a.example/1", BODY)]);
        let request = FetchRequest::urls(vec![
            "https://a.example/1".to_string(),
            "https://a.example/missing".to_string(),
        ]);
        let results = fetcher.fetch(&request).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results[0].is_error_marker());
        assert!(results[1].raw_content.starts_with("Error:"));
        assert_eq!(results[1].summary, results[1].raw_content);
        assert!(results[1].is_error_marker());
    }

    #[tokio::test]
    async fn test_missing_parameters_are_config_errors() {
        let fetcher = fetcher(vec![], &[]);
        assert!(fetcher.fetch(&FetchRequest::urls(vec![])).await.unwrap_err().is_config());
        assert!(fetcher.fetch(&FetchRequest::query("", 3)).await.unwrap_err().is_config());
    }

    #[tokio::test]
    async fn test_no_search_hits() {
        let fetcher = fetcher(vec!["https://youtube.com/watch?v=1"], &[]);
        assert!(fetcher.fetch(&FetchRequest::query("tariffs", 3)).await.unwrap().is_empty());
    }
}
