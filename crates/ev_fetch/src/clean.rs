use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

lazy_static! {
    static ref MD_IMAGE: Regex = Regex::new(r"!\[.*?\]\(.*?\)").unwrap();
    static ref MD_LINK: Regex = Regex::new(r"\[.*?\]\(.*?\)").unwrap();
    static ref MD_HEADER: Regex = Regex::new(r"#{1,6}\s*").unwrap();
    static ref NEWLINES: Regex = Regex::new(r"\n+").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// Strips markup from reader output so only prose reaches the summarizer.
pub fn clean_content(text: &str) -> String {
    // Parsing as a fragment both decodes entities and drops tags.
    let fragment = Html::parse_fragment(text);
    let text: String = fragment.root_element().text().collect();

    let text = MD_IMAGE.replace_all(&text, "");
    let text = MD_LINK.replace_all(&text, "");
    let text = MD_HEADER.replace_all(&text, "");
    let text = NEWLINES.replace_all(&text, ". ");
    let text = SPACES.replace_all(&text, " ");
    text.trim().to_string()
}

pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    tracing::debug!("Truncating content from {} words", words.len());
    words[..max_words].join(" ")
}
