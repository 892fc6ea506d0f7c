use std::sync::Arc;
use ev_core::TagExtractor;
use ev_report::{InstructionGenerator, ReportOrchestrator};

pub struct AppState {
    pub orchestrator: Arc<ReportOrchestrator>,
    pub tagger: Arc<dyn TagExtractor>,
    /// Only set when dynamic instructions are enabled.
    pub instructions: Option<Arc<InstructionGenerator>>,
}
