use ev_core::types::{FETCH_ERROR_PREFIX, SUMMARY_FAILED_PREFIX, SUMMARY_RETRIES_EXCEEDED};
use ev_core::{InferenceModel, Result};
use crate::clean::{clean_content, truncate_words};
use crate::config::FetchConfig;

/// Cleaned text shorter than this is used as its own summary.
pub const MIN_SUMMARY_INPUT: usize = 50;

/// Never fails: fetch errors pass through untouched and summarizer errors
/// become an in-band marker string.
pub async fn summarize_content(model: &dyn InferenceModel, raw_content: &str, config: &FetchConfig) -> String {
    if raw_content.starts_with(FETCH_ERROR_PREFIX) {
        return raw_content.to_string();
    }
    match summarize_with_retry(model, raw_content, config).await {
        Ok(summary) => summary,
        Err(e) => format!("{} {}", SUMMARY_FAILED_PREFIX, e),
    }
}

async fn summarize_with_retry(model: &dyn InferenceModel, raw_content: &str, config: &FetchConfig) -> Result<String> {
    let cleaned = truncate_words(&clean_content(raw_content), config.max_input_words);
    if cleaned.chars().count() < MIN_SUMMARY_INPUT {
        return Ok(cleaned);
    }

    let attempts = config.max_retries.max(1);
    for attempt in 1..=attempts {
        match model.summarize(&cleaned).await {
            Ok(summary) => return Ok(summary),
            Err(e) if e.is_recoverable() && attempt < attempts => {
                tracing::warn!("Summarizer failed on attempt {}/{}, retrying: {}", attempt, attempts, e);
            }
            Err(e) if e.is_recoverable() => {
                tracing::error!("Summarizer gave up after {} attempts: {}", attempts, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(SUMMARY_RETRIES_EXCEEDED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ev_core::{Error, GenerationRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LONG_TEXT: &str = "Tariffs on imported steel rose to twenty five percent in March, \
        prompting retaliatory measures from several trading partners.";

    /// Fails for the first `failures` calls.
    struct FlakyModel {
        failures: usize,
        calls: AtomicUsize,
        recoverable: bool,
    }

    impl FlakyModel {
        fn new(failures: usize, recoverable: bool) -> Self {
            Self { failures, calls: AtomicUsize::new(0), recoverable }
        }
    }

    #[async_trait]
    impl InferenceModel for FlakyModel {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
            unreachable!("summaries only")
        }

        async fn summarize(&self, _text: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                if self.recoverable {
                    return Err(Error::Inference("model overloaded".to_string()));
                }
                return Err(Error::Storage("unexpected".to_string()));
            }
            Ok("Steel tariffs rose.".to_string())
        }
    }

    #[tokio::test]
    async fn test_fetch_errors_pass_through() {
        let model = FlakyModel::new(0, true);
        let raw = "Error: API Error: 503 - unavailable";
        assert_eq!(summarize_content(&model, raw, &FetchConfig::default()).await, raw);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_text_is_its_own_summary() {
        let model = FlakyModel::new(0, true);
        let summary = summarize_content(&model, "## Brief\nshort note", &FetchConfig::default()).await;
        assert_eq!(summary, "Brief. short note");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recoverable_failure_is_retried() {
        let model = FlakyModel::new(1, true);
        let summary = summarize_content(&model, LONG_TEXT, &FetchConfig::default()).await;
        assert_eq!(summary, "Steel tariffs rose.");
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let model = FlakyModel::new(10, true);
        let summary = summarize_content(&model, LONG_TEXT, &FetchConfig::default()).await;
        assert_eq!(summary, SUMMARY_RETRIES_EXCEEDED);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_failures_are_not_retried() {
        let model = FlakyModel::new(1, false);
        let summary = summarize_content(&model, LONG_TEXT, &FetchConfig::default()).await;
        assert!(summary.starts_with(SUMMARY_FAILED_PREFIX));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }
}
