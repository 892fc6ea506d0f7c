use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::types::{FetchRequest, FetchedArticle};
use crate::Result;

/// A single chat-style completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Turn a prompt into prose
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Condense already-cleaned article text
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Maps a free-text query to at most `top_n` normalized keyword tags.
/// Output is not guaranteed to be deterministic.
#[async_trait]
pub trait TagExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract_tags(&self, query: &str, top_n: usize) -> Result<Vec<String>>;
}

/// Gathers fresh evidence from live sources. Per-URL failures are reported
/// in-band; only whole-request failures come back as `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<FetchedArticle>>;
}
