pub mod collate;
pub mod config;
pub mod ingest;
pub mod instructions;
pub mod lookup;
pub mod narrative;
pub mod orchestrator;
pub mod supplement;

pub use collate::collate_article_summaries;
pub use config::ReportConfig;
pub use ingest::{store_records, ArticleRecord, StoreOutcome};
pub use instructions::InstructionGenerator;
pub use lookup::query_by_tags;
pub use narrative::{NarrativeGenerator, NO_ARTICLES_SENTINEL, REPORT_ERROR_SENTINEL};
pub use orchestrator::{ReportOrchestrator, ReportRun, Stage};

pub mod prelude {
    pub use super::{ReportConfig, ReportOrchestrator, ReportRun};
    pub use super::{query_by_tags, store_records, ArticleRecord, InstructionGenerator};
}
