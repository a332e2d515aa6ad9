use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use common::{error::AppError, utils::config::AppConfig};
use tracing::debug;

use crate::{
    openai::{OpenAiCompatibleSettings, OpenAiCompatibleStrategy},
    strategy::GenerationStrategy,
    yandex::{YandexGptStrategy, YandexSettings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    Perplexity,
    OpenAi,
    YandexGpt,
}

impl LlmProvider {
    pub const ALL: [Self; 3] = [Self::Perplexity, Self::OpenAi, Self::YandexGpt];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Perplexity => "perplexity",
            Self::OpenAi => "openai",
            Self::YandexGpt => "yandexgpt",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = AppError;

    /// Names match exactly; `yandex` is accepted as an alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perplexity" => Ok(Self::Perplexity),
            "openai" => Ok(Self::OpenAi),
            "yandexgpt" | "yandex" => Ok(Self::YandexGpt),
            other => Err(AppError::UnknownProvider(other.to_string())),
        }
    }
}

/// Builds generation strategies from the application config.
#[derive(Clone)]
pub struct StrategyFactory {
    config: AppConfig,
}

impl StrategyFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.llm_timeout_secs)
    }

    pub fn create_strategy(
        &self,
        provider_name: &str,
    ) -> Result<Arc<dyn GenerationStrategy>, AppError> {
        let provider: LlmProvider = provider_name.parse()?;
        debug!(requested = provider_name, %provider, "creating generation strategy");

        let strategy: Arc<dyn GenerationStrategy> = match provider {
            LlmProvider::Perplexity => Arc::new(OpenAiCompatibleStrategy::new(
                provider.as_str(),
                &OpenAiCompatibleSettings {
                    api_key: self.config.perplexity_api_key.clone(),
                    base_url: self.config.perplexity_base_url.clone(),
                    model: self.config.perplexity_model.clone(),
                    timeout: self.timeout(),
                },
            )?),
            LlmProvider::OpenAi => Arc::new(
                OpenAiCompatibleStrategy::new(
                    provider.as_str(),
                    &OpenAiCompatibleSettings {
                        api_key: self.config.openai_api_key.clone(),
                        base_url: self.config.openai_base_url.clone(),
                        model: self.config.openai_model.clone(),
                        timeout: self.timeout(),
                    },
                )?
                .with_structured_output(true),
            ),
            LlmProvider::YandexGpt => Arc::new(YandexGptStrategy::new(YandexSettings {
                api_key: self.config.yandex_api_key.clone(),
                folder_id: self.config.yandex_folder_id.clone(),
                model: self.config.yandex_model.clone(),
                base_url: self.config.yandex_base_url.clone(),
                timeout: self.timeout(),
            })?),
        };

        Ok(strategy)
    }

    /// Providers whose credentials are present, in a fixed order.
    pub fn available_providers(&self) -> Vec<LlmProvider> {
        LlmProvider::ALL
            .into_iter()
            .filter(|provider| self.is_configured(*provider))
            .collect()
    }

    fn is_configured(&self, provider: LlmProvider) -> bool {
        let present = |value: &str| !value.trim().is_empty();
        match provider {
            LlmProvider::Perplexity => present(&self.config.perplexity_api_key),
            LlmProvider::OpenAi => present(&self.config.openai_api_key),
            LlmProvider::YandexGpt => {
                present(&self.config.yandex_api_key) && present(&self.config.yandex_folder_id)
            }
        }
    }
}

impl fmt::Debug for StrategyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyFactory")
            .field("available", &self.available_providers())
            .finish_non_exhaustive()
    }
}
