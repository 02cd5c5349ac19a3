pub mod ollama;
pub mod openai;

use crate::domain::error::Result;
use crate::domain::generation::GenerationError;
use crate::domain::llm_config::LLMConfig;
use crate::domain::llm_config::LLMProvider;
use async_trait::async_trait;
use ollama::OllamaClient;
use openai::OpenAIClient;

/// A text-generation backend: one prompt in, raw text out.
#[async_trait]
pub trait LLMClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError>;
    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    ollama: OllamaClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            openai: OpenAIClient::new(),
            ollama: OllamaClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        match config.provider {
            LLMProvider::Ollama => self.ollama.generate(config, prompt).await,
            _ => self.openai.generate(config, prompt).await,
        }
    }

    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>> {
        match config.provider {
            LLMProvider::Ollama => self.ollama.list_models(config).await,
            _ => self.openai.list_models(config).await,
        }
    }
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    if base_url.ends_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joins_with_single_slash() {
        assert_eq!(
            endpoint("http://localhost:8080/v1", "chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://localhost:8080/v1/", "models"),
            "http://localhost:8080/v1/models"
        );
    }

    #[tokio::test]
    async fn test_router_dispatches_on_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "from ollama"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = LLMConfig {
            provider: LLMProvider::Ollama,
            base_url: server.uri(),
            ..LLMConfig::default()
        };

        let text = RouterClient::new().generate(&config, "hi").await.unwrap();
        assert_eq!(text, "from ollama");
    }
}
