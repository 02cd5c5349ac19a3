mod context;
mod fallback;
mod invoker;
mod llm_output;
mod prompts;

pub use context::build_context_block;
pub use invoker::GenerationInvoker;
pub use llm_output::{extract_completion, extract_outcome};

use crate::domain::error::Result;
use crate::domain::generation::{
    GenerationError, GenerationErrorKind, GenerationOutcome, GenerationRequest,
};
use crate::infrastructure::db::TestcaseStore;
use prompts::build_generation_prompt;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;
use validator::Validate;

/// Runs the suggestion pipeline: history -> context -> prompt -> model ->
/// extraction. Reads from the store but never writes to it.
pub struct TestcaseGenerationUseCase {
    store: Arc<dyn TestcaseStore>,
    invoker: GenerationInvoker,
}

impl TestcaseGenerationUseCase {
    pub fn new(store: Arc<dyn TestcaseStore>, invoker: GenerationInvoker) -> Self {
        Self { store, invoker }
    }

    pub fn invoker(&self) -> &GenerationInvoker {
        &self.invoker
    }

    /// Returns `Err` only for an invalid request; every other failure is
    /// reported through the outcome.
    /// `Failed` outcomes echo `request` exactly as given; the pipeline itself
    /// works on a trimmed copy.
    pub async fn generate_testcase(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let normalized = request.clone().normalized();
        normalized.validate()?;

        let span = info_span!(
            "generate_testcase",
            request_id = %Uuid::new_v4(),
            api_name = %normalized.api_name,
            request_type = %normalized.request_type,
            testcase_type = %normalized.testcase_type,
        );

        Ok(self
            .run_pipeline(request, normalized)
            .instrument(span)
            .await)
    }

    async fn run_pipeline(
        &self,
        request: GenerationRequest,
        normalized: GenerationRequest,
    ) -> GenerationOutcome {
        let history = match self
            .store
            .query(Some(&normalized.api_name), Some(&normalized.testcase_type))
            .await
        {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "Failed to load historical testcases");
                return GenerationOutcome::failed(
                    GenerationError::new(GenerationErrorKind::ContextUnavailable, err.to_string()),
                    request,
                );
            }
        };

        let context = build_context_block(&history);
        let prompt = build_generation_prompt(&normalized, &context);

        let raw_output = match self.invoker.invoke(&prompt).await {
            Ok(raw_output) => raw_output,
            Err(err) => return GenerationOutcome::failed(err, request),
        };

        let outcome = extract_completion(&raw_output, &prompt, &normalized);
        info!(
            history = history.len(),
            outcome = outcome.label(),
            "Testcase generation finished"
        );
        outcome
    }
}
