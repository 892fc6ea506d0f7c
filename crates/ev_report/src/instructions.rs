use std::sync::Arc;
use ev_core::{GenerationRequest, InferenceModel};

const INSTRUCTION_SYSTEM_PROMPT: &str =
    "You are a professional data analyst specialized in generating research-oriented report guidelines.";
const INSTRUCTION_MAX_TOKENS: u32 = 150;

pub const FALLBACK_INSTRUCTIONS: &str = "Please provide a detailed analysis focused on the technical and \
    contextual aspects of the query. Include relevant background information and actionable insights.";

/// Asks the model for query-specific guidance to append to the report prompt.
pub struct InstructionGenerator {
    model: Arc<dyn InferenceModel>,
    temperature: f32,
}

impl InstructionGenerator {
    pub fn new(model: Arc<dyn InferenceModel>, temperature: f32) -> Self {
        Self { model, temperature }
    }

    pub async fn generate(&self, query: &str) -> String {
        let prompt = format!(
            "Analyze the following query and generate additional prompt instructions for a detailed, \
             research-oriented report. The instructions should focus on the core aspects of the topic, \
             outline key areas of analysis, and specify any domain-specific guidelines that would help \
             generate a comprehensive report. Query: '{}'",
            query
        );
        let request = GenerationRequest::new(INSTRUCTION_SYSTEM_PROMPT, prompt)
            .with_max_tokens(INSTRUCTION_MAX_TOKENS)
            .with_temperature(self.temperature);

        match self.model.generate(&request).await {
            Ok(instructions) if !instructions.trim().is_empty() => {
                let instructions = instructions.trim().to_string();
                tracing::info!("Dynamic instructions generated: {}", instructions);
                instructions
            }
            Ok(_) => {
                tracing::warn!("Model returned empty instructions, using fallback");
                FALLBACK_INSTRUCTIONS.to_string()
            }
            Err(e) => {
                tracing::error!("Error generating dynamic instructions: {}", e);
                FALLBACK_INSTRUCTIONS.to_string()
            }
        }
    }
}
