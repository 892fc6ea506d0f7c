use ev_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub mod models;
pub mod tagging;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL_NAME: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    OpenAI,
    Dummy,
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model '{}'. Available models: openai (default), dummy",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Dummy => write!(f, "dummy"),
        }
    }
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub kind: ModelKind,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl InferenceConfig {
    pub fn dummy() -> Self {
        Self { kind: ModelKind::Dummy, ..Self::default() }
    }
}

pub mod prelude {
    pub use super::{InferenceConfig, ModelKind};
    pub use super::models::create_model;
    pub use super::tagging::KeywordExtractor;
    pub use ev_core::{Error, GenerationRequest, InferenceModel, Result, TagExtractor};
}

pub use models::create_model;
pub use tagging::KeywordExtractor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("OpenAI".parse::<ModelKind>().unwrap(), ModelKind::OpenAI);
        assert_eq!("dummy".parse::<ModelKind>().unwrap(), ModelKind::Dummy);
        assert!("ollama".parse::<ModelKind>().unwrap_err().is_config());
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = InferenceConfig { api_key: Some("sk-secret".to_string()), ..InferenceConfig::default() };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
