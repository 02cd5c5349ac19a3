use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored test case. `id` is assigned by the store on insert.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestcaseRecord {
    pub id: i64,
    pub testcase_description: String,
    pub pattern: Option<String>,
    pub api_name: String,
    pub request_type: String,
    pub testcase_type: String,
}

/// A test case that has not been persisted yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct NewTestcase {
    #[validate(length(min = 1, max = 4096))]
    pub testcase_description: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub api_name: String,
    #[validate(length(min = 1, max = 32))]
    pub request_type: String,
    #[validate(length(min = 1, max = 64))]
    pub testcase_type: String,
}

impl NewTestcase {
    /// Trims every field and drops a blank pattern, so that length checks
    /// reject whitespace-only values.
    pub fn normalized(self) -> Self {
        Self {
            testcase_description: self.testcase_description.trim().to_string(),
            pattern: self
                .pattern
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            api_name: self.api_name.trim().to_string(),
            request_type: self.request_type.trim().to_string(),
            testcase_type: self.testcase_type.trim().to_string(),
        }
    }
}

impl TestcaseRecord {
    pub fn from_new(id: i64, testcase: NewTestcase) -> Self {
        Self {
            id,
            testcase_description: testcase.testcase_description,
            pattern: testcase.pattern,
            api_name: testcase.api_name,
            request_type: testcase.request_type,
            testcase_type: testcase.testcase_type,
        }
    }
}
