use async_trait::async_trait;
use ev_core::{Error, Result};
use reqwest::Client;
use url::form_urlencoded;
use crate::config::FetchConfig;

/// Turns a page URL into readable text.
#[async_trait]
pub trait ContentReader: Send + Sync {
    async fn read(&self, url: &str) -> Result<String>;
}

/// Client for a reader proxy that takes the target URL as its path.
pub struct ReaderClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReaderClient {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.reader_base_url.clone(),
            api_key: config.reader_api_key.clone(),
        }
    }

    pub fn endpoint(&self, url: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
        format!("{}{}", self.base_url, encoded)
    }
}

#[async_trait]
impl ContentReader for ReaderClient {
    async fn read(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(self.endpoint(url));
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Fetch(format!("API Error: {} - {}", status.as_u16(), body)));
        }
        Ok(body)
    }
}
