use ev_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fixed knobs of the supplementation policy. None of these are derived
/// per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Cached articles needed to skip fetching.
    pub min_article_threshold: usize,
    /// Tags an article must share with the query to count as cached evidence.
    pub min_tag_matches: usize,
    /// How many fresh articles to ask the fetcher for.
    pub supplement_count: usize,
    pub tag_top_n: usize,
    /// Drop fetched candidates whose summary is an in-band error marker.
    pub skip_failed_fetches: bool,
    pub narrative_max_tokens: u32,
    pub narrative_temperature: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_article_threshold: 7,
            min_tag_matches: 4,
            supplement_count: 5,
            tag_top_n: 5,
            skip_failed_fetches: true,
            narrative_max_tokens: 800,
            narrative_temperature: 0.7,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_tag_matches == 0 {
            return Err(Error::Config("min_tag_matches must be at least 1".to_string()));
        }
        if self.supplement_count == 0 {
            return Err(Error::Config("supplement_count must be at least 1".to_string()));
        }
        if self.tag_top_n == 0 {
            return Err(Error::Config("tag_top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_article_threshold, 7);
        assert_eq!(config.min_tag_matches, 4);
    }

    #[test]
    fn test_rejects_zero_knobs() {
        let config = ReportConfig { min_tag_matches: 0, ..ReportConfig::default() };
        assert!(config.validate().unwrap_err().is_config());
        let config = ReportConfig { supplement_count: 0, ..ReportConfig::default() };
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReportConfig = serde_json::from_str(r#"{"min_article_threshold": 3}"#).unwrap();
        assert_eq!(config.min_article_threshold, 3);
        assert_eq!(config.supplement_count, 5);
    }
}
