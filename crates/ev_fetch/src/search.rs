use async_trait::async_trait;
use ev_core::{Error, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;
use crate::config::FetchConfig;

/// Finds candidate source URLs for a free-text query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Scrapes the HTML-only DuckDuckGo results page.
pub struct DuckDuckGoSearch {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.search_base_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Result links are redirect URLs carrying the target in `uddg`.
    fn resolve_link(href: &str) -> Option<String> {
        let absolute = if href.starts_with("//") {
            format!("https:{}", href)
        } else {
            href.to_string()
        };
        let parsed = Url::parse(&absolute).ok()?;
        if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
            return Some(target.into_owned());
        }
        matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
    }

    pub fn parse_results(html: &str, limit: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("a.result__a") else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        document
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .filter_map(Self::resolve_link)
            .filter(|url| seen.insert(url.clone()))
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let response = self.client
            .get(&self.base_url)
            .query(&[("q", query)])
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("Search returned {}", status)));
        }
        let html = response.text().await?;
        Ok(Self::parse_results(&html, limit))
    }
}

/// Asks for twice the wanted count, then drops excluded hosts.
pub async fn discover_urls(
    provider: &dyn SearchProvider,
    config: &FetchConfig,
    query: &str,
    count: usize,
) -> Result<Vec<String>> {
    let raw = provider.search(query, count.saturating_mul(2)).await?;
    Ok(raw.into_iter()
        .filter(|url| !config.is_excluded(url))
        .take(count)
        .collect())
}
