use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use ev_core::{Error, GenerationRequest, InferenceModel, Result};
use crate::InferenceConfig;

const SUMMARY_SYSTEM: &str = "You condense news and web articles into short factual summaries.";
const SUMMARY_MAX_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Any OpenAI-compatible chat-completions endpoint.
pub struct OpenAIModel {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl fmt::Debug for OpenAIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OpenAIModel {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let api_key = config.api_key.clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("OpenAI API key is required".to_string()))?;
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_name: config.model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ChatMessage { role: "system".to_string(), content: request.system.clone() });
        }
        messages.push(ChatMessage { role: "user".to_string(), content: request.prompt.clone() });
        ChatRequest {
            model: self.model_name.clone(),
            messages,
            temperature: request.temperature.unwrap_or(self.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
        }
    }
}

#[async_trait]
impl InferenceModel for OpenAIModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = self.chat_request(request);
        tracing::debug!("Sending chat completion to {} ({})", self.base_url, self.model_name);

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("{} returned {}: {}", self.name(), status, text)));
        }

        let response = response.json::<ChatResponse>().await?;
        response.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| Error::Inference("Chat completion returned no choices".to_string()))
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let request = GenerationRequest::new(
            SUMMARY_SYSTEM,
            format!("Please summarize the following article:\n\n{}\n\nSummary:", text),
        )
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(0.0);
        self.generate(&request).await
    }
}
