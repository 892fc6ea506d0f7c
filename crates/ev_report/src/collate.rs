use std::fmt::Write as _;
use ev_core::Article;

/// One block per article, labelled by its 1-based position in `articles`.
/// Articles with an empty summary are skipped but still use up their
/// number, so the visible numbering can have gaps.
pub fn collate_article_summaries(articles: &[Article]) -> String {
    let mut collated = String::new();
    for (i, article) in articles.iter().enumerate() {
        if article.summary.is_empty() {
            continue;
        }
        let url = if article.url.is_empty() { "Unknown URL" } else { article.url.as_str() };
        let _ = write!(collated, "Article {} (URL: {}):\n{}\n\n", i + 1, url, article.summary);
    }
    collated
}
