use std::sync::{Arc, Mutex};

use tracing::error;

use crate::application::{GenerationInvoker, TestcaseGenerationUseCase, TestcaseUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_testcase_db;
use crate::infrastructure::db::testcases::TestcaseRepository;
use crate::infrastructure::db::TestcaseStore;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::interfaces::http::{add_log, LogEntry};
use crate::interfaces::state::AppState;

/// Opens the test case store and wires the use cases around it.
pub async fn setup(config: &AppConfig, logs: &Mutex<Vec<LogEntry>>) -> Result<Arc<AppState>> {
    let pool = init_testcase_db(&config.database.url, config.database.max_connections)
        .await
        .map_err(|err| {
            error!(error = %err, url = %config.database.url, "Failed to init testcase db");
            err
        })?;

    let store: Arc<dyn TestcaseStore> = Arc::new(TestcaseRepository::new(pool.clone()));
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());
    let invoker = GenerationInvoker::new(llm_client.clone(), config.llm.clone());

    let state = AppState {
        testcase_use_case: TestcaseUseCase::new(store.clone()),
        generation_use_case: TestcaseGenerationUseCase::new(store, invoker),
        llm_client,
        pool,
    };

    add_log(
        logs,
        "INFO",
        "System",
        &format!(
            "Backend initialized (provider={:?} model={})",
            config.llm.provider, config.llm.model
        ),
    );

    Ok(Arc::new(state))
}
