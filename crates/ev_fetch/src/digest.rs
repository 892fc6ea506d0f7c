use std::fmt::Write as _;
use std::path::Path;
use ev_core::{FetchedArticle, Result};

pub fn render_digest(results: &[FetchedArticle]) -> String {
    let mut out = String::new();
    for entry in results {
        let _ = writeln!(out, "URL: {}", entry.url);
        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "Summary:");
        let _ = writeln!(out, "{}", entry.summary);
        let _ = writeln!(out, "{}\n", "=".repeat(80));
    }
    out
}

/// Plain-text dump of fetched summaries, one block per URL.
pub async fn write_digest(path: &Path, results: &[FetchedArticle]) -> Result<()> {
    tokio::fs::write(path, render_digest(results)).await?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("structured_output.txt");
        let results = vec![
            FetchedArticle::new("https://a.example/1", "raw", "First summary."),
            FetchedArticle::new("https://a.example/2", "raw", "Second summary."),
        ];
        write_digest(&path, &results).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("URL: https://a.example/1\n"));
        assert!(written.contains("Summary:\nSecond summary.\n"));
        assert_eq!(written.matches(&"=".repeat(80)).count(), 2);
    }
}
