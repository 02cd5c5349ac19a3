use super::{endpoint, LLMClient};
use crate::domain::error::{AppError, Result};
use crate::domain::generation::GenerationError;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Client for servers exposing the OpenAI `/chat/completions` API.
pub struct OpenAIClient {
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        let url = endpoint(&config.base_url, "chat/completions");

        let mut request = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(config.timeout_secs));
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let body = json!({
            "model": config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "stream": false,
        });

        let response = request.json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::backend(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            GenerationError::invalid_response(format!("Failed to parse JSON: {}", e))
        })?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| GenerationError::invalid_response("Invalid response format"))
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        let url = endpoint(&config.base_url, "models");

        let mut request = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(config.timeout_secs));
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
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

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        let models = json["data"]
            .as_array()
            .ok_or_else(|| {
                AppError::LLMError("Invalid response format: missing data array".to_string())
            })?
            .iter()
            .filter_map(|m| m["id"].as_str())
            .map(|id| id.to_string())
            .collect();

        Ok(models)
    }
}
