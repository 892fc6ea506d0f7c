use std::collections::HashSet;
use ev_core::{Article, FetchedArticle};
use url::Url;

/// Absolute `http`/`https` references only.
pub fn is_well_formed_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discarded {
    pub malformed: usize,
    pub already_cached: usize,
    pub failed: usize,
}

/// Turns a fetch batch into articles worth keeping.
///
/// Candidates are checked against `cached` only, not the whole store, so a
/// row the lookup did not return can still collide on append. Missing
/// query or tags are filled from the triggering request.
pub fn select_candidates(
    fetched: Vec<FetchedArticle>,
    query: &str,
    tags: &[String],
    cached: &[Article],
    skip_failed: bool,
) -> (Vec<Article>, Discarded) {
    let existing: HashSet<&str> = cached.iter().map(|a| a.url.as_str()).collect();
    let mut discarded = Discarded::default();
    let mut survivors = Vec::with_capacity(fetched.len());

    for candidate in fetched {
        if !is_well_formed_url(&candidate.url) {
            discarded.malformed += 1;
            continue;
        }
        if existing.contains(candidate.url.as_str()) {
            discarded.already_cached += 1;
            continue;
        }
        if skip_failed && candidate.is_error_marker() {
            discarded.failed += 1;
            continue;
        }
        survivors.push(candidate.into_article(query, tags));
    }
    (survivors, discarded)
}

/// Cached evidence first, then fresh, with no reordering.
pub fn merge(cached: Vec<Article>, fresh: Vec<Article>) -> Vec<Article> {
    let mut merged = cached;
    merged.extend(fresh);
    merged
}
