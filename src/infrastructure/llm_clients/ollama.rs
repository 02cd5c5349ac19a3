use super::{endpoint, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::generation::GenerationError;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Option<Vec<OllamaModelInfo>>,
}

#[derive(Deserialize)]
struct OllamaModelInfo {
    name: String,
}

/// Client for a local Ollama daemon (`/api/generate`).
pub struct OllamaClient {
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        let url = endpoint(&config.base_url, "api/generate");
        let body = OllamaGenerateRequest {
            model: &config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: config.max_tokens,
                temperature: config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::backend(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: OllamaGenerateResponse = response.json().await.map_err(|e| {
            GenerationError::invalid_response(format!("Failed to parse JSON: {}", e))
        })?;

        if let Some(error) = json.error {
            return Err(GenerationError::backend(error));
        }

        json.response
            .ok_or_else(|| GenerationError::invalid_response("Invalid response format"))
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        let url = endpoint(&config.base_url, "api/tags");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        Ok(json
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|model| model.name)
            .collect())
    }
}
