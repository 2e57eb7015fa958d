use atc_ai::{GenerationConfig, LLMProvider, OpenAIProvider};
use atc_core::{AtcError, Settings};
use std::sync::Arc;

/// Per-process configuration handed to every request. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn LLMProvider>,
    pub generation: GenerationConfig,
}

impl AppState {
    pub fn new(settings: &Settings) -> atc_core::Result<Self> {
        let provider = OpenAIProvider::from_settings(settings)
            .map_err(|e| AtcError::Config(format!("{:#}", e)))?;
        Ok(Self {
            provider: Arc::new(provider),
            generation: GenerationConfig::from(&settings.llm),
        })
    }

    pub fn with_provider(provider: Arc<dyn LLMProvider>, generation: GenerationConfig) -> Self {
        Self {
            provider,
            generation,
        }
    }
}
