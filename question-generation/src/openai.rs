use std::{fmt, time::Duration};

use async_openai::types::{
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    ResponseFormat, ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use common::{
    error::AppError,
    types::generation::{GeneratedQuestion, GenerationParams},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    http::{status_error, transport_error},
    prompt::{build_prompt, get_question_generation_schema, QUESTION_GENERATION_SYSTEM_MESSAGE},
    response::parse_questions_reply,
    strategy::GenerationStrategy,
};

#[derive(Clone)]
pub struct OpenAiCompatibleSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Strategy for providers speaking the OpenAI chat-completions protocol
/// (OpenAI itself and Perplexity).
///
/// Request and response bodies use the `async-openai` types; the call itself
/// goes through our own client so non-success statuses keep their HTTP code.
pub struct OpenAiCompatibleStrategy {
    provider: &'static str,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    structured_output: bool,
}

impl OpenAiCompatibleStrategy {
    pub fn new(provider: &'static str, settings: &OpenAiCompatibleSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            provider,
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            structured_output: false,
        })
    }

    /// Requests a strict JSON-schema response format instead of relying on
    /// the prompt alone.
    #[must_use]
    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn build_request(
        &self,
        params: &GenerationParams,
    ) -> Result<CreateChatCompletionRequest, AppError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages([
            ChatCompletionRequestSystemMessage::from(QUESTION_GENERATION_SYSTEM_MESSAGE).into(),
            ChatCompletionRequestUserMessage::from(build_prompt(params)).into(),
        ]);

        if self.structured_output {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Assessment questions generated from the source text".into()),
                    name: "generated_questions".into(),
                    schema: Some(get_question_generation_schema()),
                    strict: Some(true),
                },
            });
        }

        builder.build().map_err(|e| {
            AppError::InternalError(format!("failed to build {} request: {e}", self.provider))
        })
    }

    async fn complete(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.provider, status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(self.provider, e))?;
        serde_json::from_str(&body).map_err(|e| AppError::MalformedProviderResponse {
            provider: self.provider.to_string(),
            message: format!("failed to decode chat completion: {e}"),
        })
    }
}

#[async_trait]
impl GenerationStrategy for OpenAiCompatibleStrategy {
    async fn generate_questions(
        &self,
        cancel: &CancellationToken,
        params: &GenerationParams,
    ) -> Result<Vec<GeneratedQuestion>, AppError> {
        if !self.is_configured() {
            return Err(AppError::ProviderNotConfigured {
                provider: self.provider.to_string(),
                missing: "api key",
            });
        }
        params.validate()?;

        let request = self.build_request(params)?;
        debug!(
            provider = self.provider,
            model = %self.model,
            text_bytes = params.text.len(),
            requested = params.num_questions,
            "requesting question generation"
        );

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AppError::Cancelled),
            response = self.complete(&request) => response?,
        };

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| AppError::MalformedProviderResponse {
                provider: self.provider.to_string(),
                message: "No content found in LLM response".into(),
            })?;

        parse_questions_reply(self.provider, content, params)
    }

    fn provider_name(&self) -> &str {
        self.provider
    }
}

impl fmt::Debug for OpenAiCompatibleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleStrategy")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("configured", &self.is_configured())
            .field("structured_output", &self.structured_output)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    const QUESTIONS_JSON: &str = r#"{"questions":[{"question":"What is 2+2?","type":"single_choice","difficulty":"easy","answers":[{"text":"4","is_correct":true},{"text":"3","is_correct":false}],"explanation":"Arithmetic"}]}"#;

    fn settings(server: &MockServer, api_key: &str) -> OpenAiCompatibleSettings {
        OpenAiCompatibleSettings {
            api_key: api_key.into(),
            base_url: server.uri(),
            model: "test-model".into(),
            timeout: Duration::from_secs(5),
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    fn params() -> GenerationParams {
        GenerationParams::new("Two plus two equals four.", 3)
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let server = MockServer::start().await;
        let strategy = OpenAiCompatibleStrategy::new("openai", &settings(&server, "")).expect("build");

        let result = strategy
            .generate_questions(&CancellationToken::new(), &params())
            .await;

        assert!(matches!(
            result,
            Err(AppError::ProviderNotConfigured { ref provider, .. }) if provider == "openai"
        ));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn fenced_reply_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(&format!("```json\n{QUESTIONS_JSON}\n```"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let strategy =
            OpenAiCompatibleStrategy::new("perplexity", &settings(&server, "test-key")).expect("build");
        let questions = strategy
            .generate_questions(&CancellationToken::new(), &params())
            .await
            .expect("generate");

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "What is 2+2?");
        assert!(questions[0].answers[0].is_correct);
    }

    #[tokio::test]
    async fn structured_output_requests_json_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "response_format": { "type": "json_schema" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(QUESTIONS_JSON)))
            .expect(1)
            .mount(&server)
            .await;

        let strategy = OpenAiCompatibleStrategy::new("openai", &settings(&server, "test-key"))
            .expect("build")
            .with_structured_output(true);
        let questions = strategy
            .generate_questions(&CancellationToken::new(), &params())
            .await
            .expect("generate");

        assert_eq!(questions.len(), 1);
    }

    async fn failure_for(template: ResponseTemplate, api_key: &str) -> AppError {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(template)
            .expect(1)
            .mount(&server)
            .await;

        OpenAiCompatibleStrategy::new("perplexity", &settings(&server, api_key))
            .expect("build")
            .generate_questions(&CancellationToken::new(), &params())
            .await
            .expect_err("non-success status must fail")
    }

    fn provider_status(err: &AppError) -> (&str, &str) {
        match err {
            AppError::Provider {
                status, message, ..
            } => (status.as_str(), message.as_str()),
            other => panic!("expected a provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_keeps_http_status_but_not_the_key() {
        let err = failure_for(
            ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })),
            "sk-secret-value",
        )
        .await;

        assert_eq!(provider_status(&err), ("401", "Incorrect API key provided"));
        assert!(!err.is_retryable());
        assert!(!err.to_string().contains("sk-secret-value"));
    }

    #[tokio::test]
    async fn server_errors_are_retryable_provider_errors() {
        let err = failure_for(
            ResponseTemplate::new(503).set_body_string("upstream down"),
            "test-key",
        )
        .await;

        assert_eq!(provider_status(&err), ("503", "upstream down"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn rate_limits_are_retryable_provider_errors() {
        let err = failure_for(
            ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "Rate limit reached",
                    "type": "requests",
                    "code": "rate_limit_exceeded"
                }
            })),
            "test-key",
        )
        .await;

        assert_eq!(provider_status(&err).0, "429");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn plain_text_client_error_is_not_a_malformed_reply() {
        let err = failure_for(
            ResponseTemplate::new(400).set_body_string("Bad Request"),
            "test-key",
        )
        .await;

        assert_eq!(provider_status(&err), ("400", "Bad Request"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn undecodable_success_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = OpenAiCompatibleStrategy::new("openai", &settings(&server, "test-key"))
            .expect("build")
            .generate_questions(&CancellationToken::new(), &params())
            .await;

        assert!(matches!(result, Err(AppError::MalformedProviderResponse { .. })));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_and_debug_hides_key() {
        let settings = OpenAiCompatibleSettings {
            api_key: "sk-hidden".into(),
            base_url: "https://api.perplexity.ai/".into(),
            model: "sonar".into(),
            timeout: Duration::from_secs(1),
        };
        let strategy = OpenAiCompatibleStrategy::new("perplexity", &settings).expect("build");

        assert_eq!(strategy.endpoint, "https://api.perplexity.ai/chat/completions");
        let rendered = format!("{strategy:?}");
        assert!(!rendered.contains("sk-hidden"));
    }

    #[tokio::test]
    async fn cancellation_aborts_the_outbound_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(QUESTIONS_JSON))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let strategy =
            OpenAiCompatibleStrategy::new("openai", &settings(&server, "test-key")).expect("build");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = strategy.generate_questions(&cancel, &params()).await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(QUESTIONS_JSON))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let mut settings = settings(&server, "test-key");
        settings.timeout = Duration::from_millis(200);
        let strategy = OpenAiCompatibleStrategy::new("openai", &settings).expect("build");

        let result = strategy
            .generate_questions(&CancellationToken::new(), &params())
            .await;

        assert!(matches!(result, Err(AppError::Timeout { ref provider }) if provider == "openai"));
    }

    #[tokio::test]
    async fn empty_question_list_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(r#"{"questions": []}"#)),
            )
            .mount(&server)
            .await;

        let strategy =
            OpenAiCompatibleStrategy::new("openai", &settings(&server, "test-key")).expect("build");
        let result = strategy
            .generate_questions(&CancellationToken::new(), &params())
            .await;

        assert!(matches!(result, Err(AppError::MalformedProviderResponse { .. })));
    }
}
