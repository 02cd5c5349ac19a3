use crate::domain::generation::GenerationError;
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Issues exactly one text-generation call per prompt with the settings it
/// was built with. Retrying is left to whoever calls the pipeline.
pub struct GenerationInvoker {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl GenerationInvoker {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub async fn invoke(&self, prompt: &str) -> Result<String, GenerationError> {
        let started = Instant::now();
        let result = self.llm_client.generate(&self.config, prompt).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => info!(
                model = %self.config.model,
                provider = ?self.config.provider,
                elapsed_ms,
                prompt_chars = prompt.chars().count(),
                output_chars = text.chars().count(),
                "Model call completed"
            ),
            Err(err) => warn!(
                model = %self.config.model,
                provider = ?self.config.provider,
                elapsed_ms,
                error_kind = %err.kind,
                error = %err.message,
                "Model call failed"
            ),
        }

        result
    }
}
