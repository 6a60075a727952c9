//! Error types for the ingest pipeline.

use std::time::Duration;

/// Errors from chunking, embedding or upserting documents.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Rate limited by the remote service.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit {
        /// Suggested retry delay, if the service provided one.
        retry_after: Option<Duration>,
    },
    /// Remote service is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Terminal errors
    /// Authentication/authorization failure.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Malformed or rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The service answered with something we could not use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IngestError {
    /// Whether this error is likely transient.
    ///
    /// The pipeline itself never retries; callers decide.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimit { .. } | Self::ServiceUnavailable(_)
        )
    }
}

/// Errors building clients or chunking settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
    /// A setting has an unusable value.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Map a non-success HTTP status to an [`IngestError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> IngestError {
    match status.as_u16() {
        401 | 403 => IngestError::Authentication(body.to_string()),
        429 => IngestError::RateLimit {
            retry_after: parse_retry_after(body),
        },
        400 | 404 | 422 => IngestError::InvalidRequest(body.to_string()),
        500..=599 => IngestError::ServiceUnavailable(body.to_string()),
        _ => IngestError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Attempt to parse a retry delay from an error body ("... retry after 20s").
fn parse_retry_after(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();
    let idx = lower.find("retry after ")?;
    let after = &lower[idx + "retry after ".len()..];
    let num_str: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    num_str.parse::<u64>().ok().map(Duration::from_secs)
}

/// Map a [`reqwest::Error`] to an [`IngestError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> IngestError {
    IngestError::Network(Box::new(err))
}
