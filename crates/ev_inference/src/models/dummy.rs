use std::fmt;
use ev_core::{GenerationRequest, InferenceModel, Result};

const SUMMARY_WORDS: usize = 20;

/// Offline stand-in. Output is a pure function of the input.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let words = request.prompt.split_whitespace().count();
        Ok(format!(
            "Executive Summary: generated offline from a {}-word prompt.\n\n{}",
            words,
            first_words(&request.prompt, 40)
        ))
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        Ok(first_words(text, SUMMARY_WORDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();

        let summary = model.summarize("This is a test article. It has multiple sentences. This is the third sentence.").await.unwrap();
        assert!(summary.starts_with("This is a test article."));
        assert!(summary.split_whitespace().count() <= SUMMARY_WORDS);

        let request = GenerationRequest::new("system", "one two three");
        let first = model.generate(&request).await.unwrap();
        let second = model.generate(&request).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("3-word prompt"));
    }
}
