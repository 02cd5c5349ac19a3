use crate::application::{TestcaseGenerationUseCase, TestcaseUseCase};
use crate::infrastructure::llm_clients::LLMClient;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub testcase_use_case: TestcaseUseCase,
    pub generation_use_case: TestcaseGenerationUseCase,
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
    /// Kept for health checks only; all queries go through the use cases.
    pub pool: SqlitePool,
}
