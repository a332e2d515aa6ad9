use std::fmt;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,
    #[serde(default)]
    pub perplexity_api_key: String,
    #[serde(default = "default_perplexity_base_url")]
    pub perplexity_base_url: String,
    #[serde(default = "default_perplexity_model")]
    pub perplexity_model: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default)]
    pub yandex_api_key: String,
    #[serde(default)]
    pub yandex_folder_id: String,
    #[serde(default = "default_yandex_model")]
    pub yandex_model: String,
    #[serde(default = "default_yandex_base_url")]
    pub yandex_base_url: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_generation_num_questions")]
    pub generation_num_questions: usize,
    #[serde(default)]
    pub generation_language: Option<String>,
}

fn default_llm_provider() -> String {
    "perplexity".to_string()
}

fn default_perplexity_base_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_perplexity_model() -> String {
    "sonar".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_yandex_model() -> String {
    "yandexgpt-lite".to_string()
}

fn default_yandex_base_url() -> String {
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_generation_num_questions() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_llm_provider(),
            perplexity_api_key: String::new(),
            perplexity_base_url: default_perplexity_base_url(),
            perplexity_model: default_perplexity_model(),
            openai_api_key: String::new(),
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            yandex_api_key: String::new(),
            yandex_folder_id: String::new(),
            yandex_model: default_yandex_model(),
            yandex_base_url: default_yandex_base_url(),
            llm_timeout_secs: default_llm_timeout_secs(),
            generation_num_questions: default_generation_num_questions(),
            generation_language: None,
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("llm_provider", &self.llm_provider)
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("perplexity_base_url", &self.perplexity_base_url)
            .field("perplexity_model", &self.perplexity_model)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("yandex_api_key", &redact(&self.yandex_api_key))
            .field("yandex_folder_id", &self.yandex_folder_id)
            .field("yandex_model", &self.yandex_model)
            .field("yandex_base_url", &self.yandex_base_url)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("generation_num_questions", &self.generation_num_questions)
            .field("generation_language", &self.generation_language)
            .finish()
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_api_keys() {
        let config = AppConfig {
            openai_api_key: "sk-very-secret".into(),
            yandex_api_key: "yandex-secret".into(),
            ..Default::default()
        };

        let rendered = format!("{config:?}");

        assert!(!rendered.contains("sk-very-secret"));
        assert!(!rendered.contains("yandex-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("perplexity_api_key: \"<unset>\""));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("openai_api_key", "key")
            .and_then(|builder| builder.build())
            .and_then(Config::try_deserialize)
            .expect("config should deserialize");

        assert_eq!(config.openai_api_key, "key");
        assert_eq!(config.llm_provider, "perplexity");
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.generation_num_questions, 10);
        assert!(config.generation_language.is_none());
    }
}
