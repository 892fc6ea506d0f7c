use std::fmt;
use std::sync::Arc;

use ev_core::tags::normalize_tags;
use ev_core::{Article, ArticleStorage, Error, FetchRequest, Fetcher, InferenceModel, Result, TagExtractor};
use serde::{Deserialize, Serialize};

use crate::collate::collate_article_summaries;
use crate::config::ReportConfig;
use crate::lookup::query_by_tags;
use crate::narrative::{NarrativeGenerator, NO_ARTICLES_SENTINEL, REPORT_ERROR_SENTINEL};
use crate::supplement::{merge, select_candidates, Discarded};

/// Where a run has got to. A run walks these in order, taking exactly one of
/// `Sufficient` or `Supplementing`, and may stop at `Merged` when there is
/// no evidence at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Tagged,
    LookedUp,
    Sufficient,
    Supplementing,
    Merged,
    Collated,
    Narrated,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::Tagged => "TAGGED",
            Stage::LookedUp => "LOOKED_UP",
            Stage::Sufficient => "SUFFICIENT",
            Stage::Supplementing => "SUPPLEMENTING",
            Stage::Merged => "MERGED",
            Stage::Collated => "COLLATED",
            Stage::Narrated => "NARRATED",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Everything one orchestrator run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRun {
    pub report: String,
    pub tags: Vec<String>,
    /// Cached articles first, then the fresh ones.
    pub articles: Vec<Article>,
    pub cached_count: usize,
    pub supplemented: bool,
    /// Rows actually inserted by the supplement append.
    pub appended: usize,
    #[serde(skip)]
    pub discarded: Discarded,
    pub stages: Vec<Stage>,
    /// The model call behind `Stage::Narrated` returned a report.
    pub narrated: bool,
}

impl ReportRun {
    /// True when `report` came back from the model rather than being a
    /// fixed fallback message.
    pub fn has_narrative(&self) -> bool {
        self.narrated && self.stages.contains(&Stage::Narrated)
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!("Report stage: {}", stage);
        self.stages.push(stage);
    }
}

struct Supplement {
    fresh: Vec<Article>,
    discarded: Discarded,
    appended: usize,
}

pub struct ReportOrchestrator {
    tagger: Arc<dyn TagExtractor>,
    storage: Arc<dyn ArticleStorage>,
    fetcher: Arc<dyn Fetcher>,
    narrator: NarrativeGenerator,
    config: ReportConfig,
}

impl ReportOrchestrator {
    pub fn new(
        tagger: Arc<dyn TagExtractor>,
        storage: Arc<dyn ArticleStorage>,
        fetcher: Arc<dyn Fetcher>,
        model: Arc<dyn InferenceModel>,
        config: ReportConfig,
    ) -> Result<Self> {
        config.validate()?;
        let narrator = NarrativeGenerator::new(model, config.narrative_max_tokens, config.narrative_temperature);
        Ok(Self { tagger, storage, fetcher, narrator, config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<dyn ArticleStorage> {
        self.storage.clone()
    }

    /// Answers `query` with a report string. Only configuration errors
    /// escape; every other failure degrades to a valid result.
    pub async fn generate_report(&self, query: &str, extra_instructions: &str) -> Result<String> {
        Ok(self.run(query, extra_instructions).await?.report)
    }

    pub async fn run(&self, query: &str, extra_instructions: &str) -> Result<ReportRun> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Config("query must not be empty".to_string()));
        }

        let mut run = ReportRun {
            report: String::new(),
            tags: Vec::new(),
            articles: Vec::new(),
            cached_count: 0,
            supplemented: false,
            appended: 0,
            discarded: Discarded::default(),
            stages: Vec::new(),
            narrated: false,
        };
        run.enter(Stage::Start);

        run.tags = self.extract_tags(query).await?;
        tracing::info!("Extracted tags: {:?}", run.tags);
        run.enter(Stage::Tagged);

        let cached = query_by_tags(self.storage.as_ref(), &run.tags, self.config.min_tag_matches).await;
        run.cached_count = cached.len();
        tracing::info!("Found {} cached article(s) in database", cached.len());
        run.enter(Stage::LookedUp);

        let merged = if cached.len() >= self.config.min_article_threshold {
            run.enter(Stage::Sufficient);
            cached
        } else {
            run.enter(Stage::Supplementing);
            run.supplemented = true;
            let outcome = self.supplement(query, &run.tags, &cached).await?;
            run.discarded = outcome.discarded;
            run.appended = outcome.appended;
            merge(cached, outcome.fresh)
        };
        run.articles = merged;
        run.enter(Stage::Merged);

        if run.articles.is_empty() {
            tracing::warn!("No relevant articles found for query '{}'", query);
            run.report = NO_ARTICLES_SENTINEL.to_string();
            return Ok(run);
        }

        let context = collate_article_summaries(&run.articles);
        run.enter(Stage::Collated);

        tracing::info!("Generating report from {} article(s) with {}", run.articles.len(), self.narrator.model_name());
        match self.narrator.try_narrate(&context, query, extra_instructions).await {
            Some(report) => {
                run.report = report;
                run.narrated = true;
            }
            None => run.report = REPORT_ERROR_SENTINEL.to_string(),
        }
        run.enter(Stage::Narrated);
        run.enter(Stage::Done);
        Ok(run)
    }

    async fn extract_tags(&self, query: &str) -> Result<Vec<String>> {
        match self.tagger.extract_tags(query, self.config.tag_top_n).await {
            Ok(tags) => {
                let mut tags = normalize_tags(&tags);
                tags.truncate(self.config.tag_top_n);
                Ok(tags)
            }
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                tracing::error!("Tag extraction with {} failed: {}", self.tagger.name(), e);
                Ok(Vec::new())
            }
        }
    }

    async fn supplement(&self, query: &str, tags: &[String], cached: &[Article]) -> Result<Supplement> {
        tracing::info!(
            "Fewer than {} cached articles, fetching {} more",
            self.config.min_article_threshold,
            self.config.supplement_count
        );
        let request = FetchRequest::query(query, self.config.supplement_count);
        let fetched = match self.fetcher.fetch(&request).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_config() => return Err(e),
            Err(e) => {
                tracing::error!("Fetching new articles failed: {}", e);
                Vec::new()
            }
        };

        let (fresh, discarded) = select_candidates(fetched, query, tags, cached, self.config.skip_failed_fetches);
        if discarded != Discarded::default() {
            tracing::info!(
                "Discarded candidates: {} malformed, {} already cached, {} failed",
                discarded.malformed,
                discarded.already_cached,
                discarded.failed
            );
        }

        let mut appended = 0;
        if !fresh.is_empty() {
            match self.storage.append_articles(&fresh).await {
                Ok(inserted) => {
                    appended = inserted;
                    tracing::info!("Appended {} new article(s) to database", inserted);
                }
                Err(e) => tracing::error!("Error inserting articles into database: {}", e),
            }
        }
        Ok(Supplement { fresh, discarded, appended })
    }
}
