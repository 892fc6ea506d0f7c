use std::sync::Arc;
use ev_core::{GenerationRequest, InferenceModel};

pub const REPORT_ERROR_SENTINEL: &str = "Error generating report.";
pub const NO_ARTICLES_SENTINEL: &str = "No relevant articles found to generate a report.";
pub const ANALYST_SYSTEM_PROMPT: &str = "You are a professional data analyst.";

/// The fixed instruction block, with extra instructions appended after a
/// newline when there are any. Extras never replace the base block.
pub fn build_report_prompt(context: &str, query: &str, extra_instructions: &str) -> String {
    let base = format!(
        r#"
You are an expert data analyst. Based on the following information extracted from various reputable sources:
{context}

Generate a comprehensive and deeply researched report addressing the query: "{query}". Your report should:
1. **Executive Summary:** Present a concise overview of the key findings.
2. **Detailed Analysis:** Provide an in-depth analysis that synthesizes the information, identifies underlying trends, and explains the significance of the data.
3. **Supplementary Insights:** Offer additional insights such as comparisons with historical data, contextual factors influencing the trends, and potential implications for future decisions.
4. **Conclusion:** Summarize the overall insights and propose actionable recommendations or considerations.

Ensure that the report is clear, logically organized, and written in a tone appropriate for strategic decision-making rather than journalistic reporting.
Ensure that the report includes all sections as described and do not shorten the output to only a final summary.
"#
    );
    if extra_instructions.is_empty() {
        base
    } else {
        format!("{}\n{}", base, extra_instructions)
    }
}

/// Turns collated evidence into the final report text.
pub struct NarrativeGenerator {
    model: Arc<dyn InferenceModel>,
    max_tokens: u32,
    temperature: f32,
}

impl NarrativeGenerator {
    pub fn new(model: Arc<dyn InferenceModel>, max_tokens: u32, temperature: f32) -> Self {
        Self { model, max_tokens, temperature }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Model output verbatim, or `None` when the model failed.
    pub async fn try_narrate(&self, context: &str, query: &str, extra_instructions: &str) -> Option<String> {
        let request = GenerationRequest::new(ANALYST_SYSTEM_PROMPT, build_report_prompt(context, query, extra_instructions))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        match self.model.generate(&request).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Error generating analysis report: {}", e);
                None
            }
        }
    }
}
