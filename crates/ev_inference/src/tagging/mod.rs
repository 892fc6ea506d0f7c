use std::collections::HashMap;
use async_trait::async_trait;
use ev_core::{Result, TagExtractor};

pub mod stopwords;

use stopwords::is_stop_word;

/// Tags scoring at or below this are considered noise.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTag {
    pub tag: String,
    pub score: f32,
    first_seen: usize,
}

/// Local single-token keyword extractor. Each candidate is scored by how
/// often it appears and how early it first shows up, both mapped into
/// `(0, 1]` so the threshold is comparable across queries.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    threshold: f32,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self { threshold: DEFAULT_SCORE_THRESHOLD }
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    fn candidates(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() >= 2)
            .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
            .filter(|w| !is_stop_word(w))
            .collect()
    }

    pub fn score(&self, text: &str) -> Vec<ScoredTag> {
        let words = Self::candidates(text);
        if words.is_empty() {
            return Vec::new();
        }

        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, word) in words.iter().enumerate() {
            stats.entry(word.as_str()).or_insert((0, i)).0 += 1;
        }
        let max_freq = stats.values().map(|(freq, _)| *freq).max().unwrap_or(1) as f32;
        let total = words.len() as f32;

        let mut scored: Vec<ScoredTag> = stats.into_iter()
            .map(|(word, (freq, first_seen))| ScoredTag {
                tag: word.to_string(),
                score: 0.5 * (freq as f32 / max_freq) + 0.5 * (1.0 - first_seen as f32 / total),
                first_seen,
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score.partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.first_seen.cmp(&b.first_seen))
        });
        scored
    }

    pub fn extract(&self, text: &str, top_n: usize) -> Vec<String> {
        self.score(text)
            .into_iter()
            .take(top_n)
            .filter(|t| t.score > self.threshold)
            .map(|t| t.tag)
            .collect()
    }
}

#[async_trait]
impl TagExtractor for KeywordExtractor {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn extract_tags(&self, query: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(self.extract(query, top_n))
    }
}
