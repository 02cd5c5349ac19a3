use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    /// Any server speaking the OpenAI `/chat/completions` dialect
    /// (llama.cpp server, LM Studio, vLLM).
    #[default]
    Local,
    OpenAI,
    Ollama,
}

/// Generation settings fixed at startup. Callers of the pipeline never
/// override them per request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Local,
            base_url: "http://localhost:8080/v1".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_key: None,
            max_tokens: 300,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}
