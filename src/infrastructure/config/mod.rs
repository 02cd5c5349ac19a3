use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV_PREFIX: &str = "TESTCASE_LLM_";
pub const CONFIG_PATH_ENV: &str = "TESTCASE_LLM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "testcase-llm.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://testcases.db".to_string(),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    /// `tracing` env-filter directive; `RUST_LOG` wins when set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LLMConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file named by `TESTCASE_LLM_CONFIG`
    /// (or `testcase-llm.toml`), then `TESTCASE_LLM_*` variables with `__`
    /// separating nested keys.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Ok(Self::figment(&path).extract()?)
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed(CONFIG_ENV_PREFIX)
                    .ignore(&["config"])
                    .split("__"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm_config::LLMProvider;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config: AppConfig = AppConfig::figment(DEFAULT_CONFIG_FILE).extract()?;
            assert_eq!(config.server.port, 8000);
            assert_eq!(config.database.url, "sqlite://testcases.db");
            assert_eq!(config.llm.max_tokens, 300);
            assert_eq!(config.llm.provider, LLMProvider::Local);
            assert_eq!(config.log_filter, "info");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    log_filter = "debug"

                    [server]
                    port = 9000

                    [llm]
                    provider = "ollama"
                    base_url = "http://localhost:11434"
                    model = "mistral"
                    temperature = 0.2
                "#,
            )?;
            jail.set_env("TESTCASE_LLM_SERVER__PORT", "9100");
            jail.set_env("TESTCASE_LLM_LLM__MODEL", "llama3");

            let config: AppConfig = AppConfig::figment(DEFAULT_CONFIG_FILE).extract()?;
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.llm.provider, LLMProvider::Ollama);
            assert_eq!(config.llm.model, "llama3");
            assert_eq!(config.llm.base_url, "http://localhost:11434");
            assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
            assert_eq!(config.log_filter, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_config_path_variable_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[database]\nurl = \"sqlite://custom.db\"\n")?;
            jail.set_env(CONFIG_PATH_ENV, "custom.toml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.database.url, "sqlite://custom.db");
            Ok(())
        });
    }
}
