use std::{fmt, time::Duration};

use async_trait::async_trait;
use common::{
    error::AppError,
    types::generation::{GeneratedQuestion, GenerationParams},
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    http::{status_error, transport_error},
    prompt::{build_prompt, QUESTION_GENERATION_SYSTEM_MESSAGE},
    response::parse_questions_reply,
    strategy::GenerationStrategy,
};

pub const PROVIDER_NAME: &str = "yandexgpt";

const TEMPERATURE: f32 = 0.6;
// The completion API takes the token limit as a string.
const MAX_TOKENS: &str = "2000";

#[derive(Clone)]
pub struct YandexSettings {
    pub api_key: String,
    pub folder_id: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

pub struct YandexGptStrategy {
    client: reqwest::Client,
    settings: YandexSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f32,
    max_tokens: &'static str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

impl YandexGptStrategy {
    pub fn new(settings: YandexSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.settings.folder_id, self.settings.model)
    }

    fn ensure_configured(&self) -> Result<(), AppError> {
        let missing = if self.settings.api_key.trim().is_empty() {
            "api key"
        } else if self.settings.folder_id.trim().is_empty() {
            "folder id"
        } else {
            return Ok(());
        };

        Err(AppError::ProviderNotConfigured {
            provider: PROVIDER_NAME.to_string(),
            missing,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let request = CompletionRequest {
            model_uri: self.model_uri(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
            messages: [
                Message {
                    role: "system",
                    text: QUESTION_GENERATION_SYSTEM_MESSAGE,
                },
                Message {
                    role: "user",
                    text: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.settings.base_url)
            .header("Authorization", format!("Api-Key {}", self.settings.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER_NAME, status, &body));
        }

        let body = response.text().await.map_err(|e| transport_error(PROVIDER_NAME, e))?;
        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| AppError::MalformedProviderResponse {
                provider: PROVIDER_NAME.to_string(),
                message: format!("failed to decode completion response: {e}"),
            })?;

        parsed
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|alternative| alternative.message.text)
            .ok_or_else(|| AppError::MalformedProviderResponse {
                provider: PROVIDER_NAME.to_string(),
                message: "response contained no alternatives".into(),
            })
    }
}

#[async_trait]
impl GenerationStrategy for YandexGptStrategy {
    async fn generate_questions(
        &self,
        cancel: &CancellationToken,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        self.ensure_configured()?;
        params.validate()?;

        let prompt = build_prompt(params);
        debug!(
            provider = PROVIDER_NAME,
            model_uri = %self.model_uri(),
            text_bytes = params.text.len(),
            prompt_bytes = prompt.len(),
            requested = params.num_questions,
            "requesting question generation"
        );

        let content = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AppError::Cancelled),
            content = self.complete(&prompt) => content?,
        };

        parse_questions_reply(PROVIDER_NAME, &content, params)
    }

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }
}

impl fmt::Debug for YandexGptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YandexGptStrategy")
            .field("model_uri", &self.model_uri())
            .field("base_url", &self.settings.base_url)
            .field(
                "api_key",
                &if self.settings.api_key.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .finish_non_exhaustive()
    }
}
