//! Error types and HTTP/reqwest error mapping for the webhook client.

/// Errors from relaying a chat message to the webhook.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Rate limited by the webhook host.
    #[error("rate limited: {0}")]
    RateLimit(String),
    /// Webhook host is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// The response body failed after streaming began.
    #[error("stream error: {0}")]
    Stream(String),

    // Terminal errors
    /// Authentication/authorization failure.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The webhook endpoint does not exist (or is not active).
    #[error("webhook not found: {0}")]
    NotFound(String),
    /// Malformed or rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RelayError {
    /// Whether this error is likely transient.
    ///
    /// Nothing in this crate retries; the classification is for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimit(_) | Self::ServiceUnavailable(_) | Self::Stream(_)
        )
    }
}

/// Errors building a client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
    /// The webhook URL is not an absolute http(s) URL.
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),
}

/// Map a non-success HTTP status from the webhook to a [`RelayError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> RelayError {
    match status.as_u16() {
        401 | 403 => RelayError::Authentication(body.to_string()),
        404 => RelayError::NotFound(body.to_string()),
        429 => RelayError::RateLimit(body.to_string()),
        500..=599 => RelayError::ServiceUnavailable(body.to_string()),
        _ => RelayError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to a [`RelayError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RelayError {
    RelayError::Network(Box::new(err))
}
