use std::collections::HashSet;

/// Lower-cases and trims a tag. Empty results are dropped by callers.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalizes a tag list, dropping blanks and repeats but keeping first-seen order.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Size of the intersection of two tag collections, treated as sets.
pub fn shared_count(a: &[String], b: &[String]) -> usize {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.intersection(&b).count()
}

pub fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().any(|t| b.contains(t))
}
