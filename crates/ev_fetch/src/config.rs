use std::fmt;

pub const DEFAULT_READER_URL: &str = "https://r.jina.ai/";
pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; evidence-fetcher/0.1)";

/// Video hosts never yield article text worth summarizing.
pub const EXCLUDED_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "vimeo.com", "dailymotion.com"];

#[derive(Clone)]
pub struct FetchConfig {
    pub excluded_domains: Vec<String>,
    pub reader_base_url: String,
    pub reader_api_key: Option<String>,
    pub search_base_url: String,
    pub user_agent: String,
    /// Total summarization attempts per article.
    pub max_retries: usize,
    /// Cleaned text is cut to this many words before summarizing.
    pub max_input_words: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            excluded_domains: EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            reader_base_url: DEFAULT_READER_URL.to_string(),
            reader_api_key: None,
            search_base_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
            max_input_words: 1000,
        }
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("excluded_domains", &self.excluded_domains)
            .field("reader_base_url", &self.reader_base_url)
            .field("reader_api_key", &self.reader_api_key.as_deref().map(|_| "<redacted>"))
            .field("search_base_url", &self.search_base_url)
            .field("max_retries", &self.max_retries)
            .field("max_input_words", &self.max_input_words)
            .finish()
    }
}

impl FetchConfig {
    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded_domains.iter().any(|domain| url.contains(domain.as_str()))
    }
}
