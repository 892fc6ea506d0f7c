use std::sync::Arc;
use ev_core::{InferenceModel, Result};
use crate::{InferenceConfig, ModelKind};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAIModel;

pub async fn create_model(config: &InferenceConfig) -> Result<Arc<dyn InferenceModel>> {
    let model: Arc<dyn InferenceModel> = match config.kind {
        ModelKind::OpenAI => Arc::new(OpenAIModel::new(config)?),
        ModelKind::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::debug!("Created inference model {}", model.name());
    Ok(model)
}
