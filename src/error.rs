// Error types shared by the API clients and the pipeline
// Every error maps onto one ErrorCategory so callers can decide between
// "skip and continue" and "abort this video".

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    TransientRateLimit,
    NotFoundOrBadInput,
    TransportFailure,
    PartialData,
}

/// Errors from the YouTube Data API (comments, replies, video metadata)
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("YouTube rate limit or quota exceeded ({reason})")]
    RateLimited { reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("YouTube API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode YouTube response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::RateLimited { .. } => ErrorCategory::TransientRateLimit,
            ProviderError::NotFound(_) => ErrorCategory::NotFoundOrBadInput,
            ProviderError::Api { .. }
            | ProviderError::Transport(_)
            | ProviderError::Decode(_) => ErrorCategory::TransportFailure,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Errors from the text generation provider
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Model {model} is rate limited (429)")]
    RateLimited { model: String },
    #[error("Generation API error ({status}) for {model}: {message}")]
    Api { model: String, status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Response for {model} contained no text")]
    EmptyResponse { model: String },
    #[error("Failed to decode generation response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenerationError::RateLimited { .. } => ErrorCategory::TransientRateLimit,
            GenerationError::Api { status: 404, .. } => ErrorCategory::NotFoundOrBadInput,
            _ => ErrorCategory::TransportFailure,
        }
    }
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Telegram API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV writer error: {0}")]
    Flush(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Per-video failure recorded in a run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ReportedError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::NotFoundOrBadInput,
            message: message.into(),
        }
    }

    /// A harvest that stopped early still returns the records it collected.
    pub fn partial(source: &ProviderError) -> Self {
        Self {
            category: ErrorCategory::PartialData,
            message: format!("{} ({:?})", source, source.category()),
        }
    }
}

impl From<&ProviderError> for ReportedError {
    fn from(e: &ProviderError) -> Self {
        Self {
            category: e.category(),
            message: e.to_string(),
        }
    }
}
