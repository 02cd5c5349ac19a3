use super::TestcaseStore;
use crate::domain::error::{AppError, Result};
use crate::domain::testcase::{NewTestcase, TestcaseRecord};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

const INSERT_TESTCASE: &str = "INSERT INTO api_testcases (testcase_description, pattern, api_name, request_type, testcase_type)
     VALUES (?, ?, ?, ?, ?)";

pub struct TestcaseRepository {
    pool: SqlitePool,
}

impl TestcaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestcaseStore for TestcaseRepository {
    async fn create(&self, testcase: &NewTestcase) -> Result<i64> {
        let result = sqlx::query(INSERT_TESTCASE)
            .bind(&testcase.testcase_description)
            .bind(&testcase.pattern)
            .bind(&testcase.api_name)
            .bind(&testcase.request_type)
            .bind(&testcase.testcase_type)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert testcase: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    async fn create_many(&self, testcases: &[NewTestcase]) -> Result<Vec<i64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        let mut ids = Vec::with_capacity(testcases.len());
        for testcase in testcases {
            let result = sqlx::query(INSERT_TESTCASE)
                .bind(&testcase.testcase_description)
                .bind(&testcase.pattern)
                .bind(&testcase.api_name)
                .bind(&testcase.request_type)
                .bind(&testcase.testcase_type)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to insert testcase: {e}")))?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit testcases: {e}")))?;

        Ok(ids)
    }

    async fn query(
        &self,
        api_name: Option<&str>,
        testcase_type: Option<&str>,
    ) -> Result<Vec<TestcaseRecord>> {
        let api_name = api_name.map(str::trim).filter(|value| !value.is_empty());
        let testcase_type = testcase_type.map(str::trim).filter(|value| !value.is_empty());

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, testcase_description, pattern, api_name, request_type, testcase_type FROM api_testcases",
        );
        let mut separator = " WHERE ";
        if let Some(api_name) = api_name {
            builder.push(separator).push("api_name = ").push_bind(api_name);
            separator = " AND ";
        }
        if let Some(testcase_type) = testcase_type {
            builder
                .push(separator)
                .push("testcase_type = ")
                .push_bind(testcase_type);
        }
        builder.push(" ORDER BY id ASC");

        let rows = builder
            .build_query_as::<TestcaseEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to query testcases: {e}")))?;

        debug!(
            api_name = api_name.unwrap_or("*"),
            testcase_type = testcase_type.unwrap_or("*"),
            count = rows.len(),
            "Loaded testcases"
        );

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct TestcaseEntity {
    id: i64,
    testcase_description: String,
    pattern: Option<String>,
    api_name: String,
    request_type: String,
    testcase_type: String,
}

impl From<TestcaseEntity> for TestcaseRecord {
    fn from(entity: TestcaseEntity) -> Self {
        Self {
            id: entity.id,
            testcase_description: entity.testcase_description,
            pattern: entity.pattern,
            api_name: entity.api_name,
            request_type: entity.request_type,
            testcase_type: entity.testcase_type,
        }
    }
}
