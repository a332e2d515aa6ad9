//! Error mapping shared by the HTTP-backed strategies.

use common::error::AppError;
use reqwest::StatusCode;
use serde::Deserialize;

const ERROR_BODY_LIMIT: usize = 500;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Non-success response. `status` is always the numeric HTTP status so that
/// [`AppError::is_retryable`] can judge it.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map_or_else(|_| truncate_body(body), |envelope| envelope.error.message);

    AppError::Provider {
        provider: provider.to_string(),
        status: status.as_u16().to_string(),
        message,
    }
}

pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        return AppError::Timeout {
            provider: provider.to_string(),
        };
    }
    AppError::Provider {
        provider: provider.to_string(),
        status: err
            .status()
            .map_or_else(|| "transport".into(), |status| status.as_u16().to_string()),
        message: err.without_url().to_string(),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
