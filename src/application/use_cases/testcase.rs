use crate::domain::error::{AppError, Result};
use crate::domain::generation::GenerationOutcome;
use crate::domain::testcase::{NewTestcase, TestcaseRecord};
use crate::infrastructure::db::TestcaseStore;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct TestcaseUseCase {
    store: Arc<dyn TestcaseStore>,
}

impl TestcaseUseCase {
    pub fn new(store: Arc<dyn TestcaseStore>) -> Self {
        Self { store }
    }

    /// Validates every test case before saving any of them.
    pub async fn save_testcases(&self, testcases: Vec<NewTestcase>) -> Result<Vec<i64>> {
        let mut normalized = Vec::with_capacity(testcases.len());
        for (index, testcase) in testcases.into_iter().enumerate() {
            let testcase = testcase.normalized();
            testcase.validate().map_err(|err| {
                AppError::ValidationError(format!("testcase[{}]: {}", index, err))
            })?;
            normalized.push(testcase);
        }

        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.store.create_many(&normalized).await?;
        info!(count = ids.len(), "Saved testcases");
        Ok(ids)
    }

    pub async fn list_testcases(
        &self,
        api_name: Option<&str>,
        testcase_type: Option<&str>,
    ) -> Result<Vec<TestcaseRecord>> {
        self.store.query(api_name, testcase_type).await
    }

    /// Persists the test case carried by a `Structured` or `Fallback`
    /// outcome. `Failed` outcomes have nothing to save.
    pub async fn save_outcome(&self, outcome: &GenerationOutcome) -> Result<Option<i64>> {
        let Some(testcase) = outcome.testcase() else {
            return Ok(None);
        };

        let testcase = testcase.clone().normalized();
        testcase.validate()?;
        let id = self.store.create(&testcase).await?;
        info!(id, outcome = outcome.label(), "Saved generated testcase");
        Ok(Some(id))
    }
}
