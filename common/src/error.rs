use thiserror::Error;

// Core internal errors. Variants carry identifying context (tag, provider,
// question id, status) but never credentials.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to extract text from {file_type} document: {message}")]
    Extraction { file_type: String, message: String },
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),
    #[error("{provider} provider is not configured: missing {missing}")]
    ProviderNotConfigured {
        provider: String,
        missing: &'static str,
    },
    #[error("{provider} API error (status {status}): {message}")]
    Provider {
        provider: String,
        status: String,
        message: String,
    },
    #[error("Malformed {provider} response: {message}")]
    MalformedProviderResponse { provider: String, message: String },
    #[error("No generation strategy set")]
    NoStrategySet,
    #[error("Operation cancelled")]
    Cancelled,
    #[error("{provider} request timed out")]
    Timeout { provider: String },
    #[error("Failed to convert question {question_id}: {reason}")]
    ConversionFailure { question_id: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl AppError {
    /// True for errors raised because the caller's cancellation signal fired
    /// or the outbound call ran past its deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout { .. })
    }

    /// Whether repeating the same call with identical arguments may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io(_) | Self::Timeout { .. } | Self::Cancelled => true,
            Self::Provider { status, .. } => status == "429" || status.starts_with('5'),
            _ => false,
        }
    }
}
