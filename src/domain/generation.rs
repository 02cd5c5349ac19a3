use crate::domain::error::AppError;
use crate::domain::testcase::NewTestcase;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::Validate;

/// Caller input for one generation run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct GenerationRequest {
    #[validate(length(min = 1, max = 256))]
    pub api_name: String,
    #[validate(length(min = 1, max = 32))]
    pub request_type: String,
    #[validate(length(min = 1, max = 64))]
    pub testcase_type: String,
    #[validate(length(min = 1, max = 4096))]
    pub user_prompt: String,
}

impl GenerationRequest {
    pub fn normalized(self) -> Self {
        Self {
            api_name: self.api_name.trim().to_string(),
            request_type: self.request_type.trim().to_string(),
            testcase_type: self.testcase_type.trim().to_string(),
            user_prompt: self.user_prompt.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// The backend could not be reached.
    Unavailable,
    Timeout,
    /// The backend answered with an error status or error payload.
    Backend,
    /// The backend answered, but not with generated text.
    InvalidResponse,
    /// Historical test cases could not be loaded for the prompt.
    ContextUnavailable,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationErrorKind::Unavailable => "unavailable",
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::Backend => "backend",
            GenerationErrorKind::InvalidResponse => "invalid_response",
            GenerationErrorKind::ContextUnavailable => "context_unavailable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Backend, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidResponse, message)
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            GenerationErrorKind::Timeout
        } else if err.is_connect() {
            GenerationErrorKind::Unavailable
        } else if err.is_decode() {
            GenerationErrorKind::InvalidResponse
        } else {
            GenerationErrorKind::Backend
        };
        Self::new(kind, format!("Request failed: {}", err))
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::LLMError(err.to_string())
    }
}

/// Result of one pipeline run. Exactly one shape is produced per call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The model answered with a well-formed test case.
    Structured { testcase: NewTestcase },
    /// The model answered, but nothing parseable was found. The test case is
    /// synthesized from the request; the raw answer is kept for review.
    Fallback {
        testcase: NewTestcase,
        raw_model_text: String,
    },
    /// The model could not be called.
    Failed {
        error_kind: GenerationErrorKind,
        message: String,
        request: GenerationRequest,
    },
}

impl GenerationOutcome {
    pub fn failed(error: GenerationError, request: GenerationRequest) -> Self {
        GenerationOutcome::Failed {
            error_kind: error.kind,
            message: error.message,
            request,
        }
    }

    /// The test case a caller may persist, if any.
    pub fn testcase(&self) -> Option<&NewTestcase> {
        match self {
            GenerationOutcome::Structured { testcase } => Some(testcase),
            GenerationOutcome::Fallback { testcase, .. } => Some(testcase),
            GenerationOutcome::Failed { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Structured { .. } => "structured",
            GenerationOutcome::Fallback { .. } => "fallback",
            GenerationOutcome::Failed { .. } => "failed",
        }
    }
}
