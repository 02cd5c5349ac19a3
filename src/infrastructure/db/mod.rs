pub mod connection;
pub mod testcases;

use crate::domain::error::Result;
use crate::domain::testcase::{NewTestcase, TestcaseRecord};
use async_trait::async_trait;

/// Persistence for test cases. Queries return records in insertion order.
#[async_trait]
pub trait TestcaseStore: Send + Sync {
    async fn create(&self, testcase: &NewTestcase) -> Result<i64>;

    /// Inserts every test case or none of them.
    async fn create_many(&self, testcases: &[NewTestcase]) -> Result<Vec<i64>>;

    /// Filters are conjunctive; `None` (or blank) means unfiltered.
    async fn query(
        &self,
        api_name: Option<&str>,
        testcase_type: Option<&str>,
    ) -> Result<Vec<TestcaseRecord>>;
}
