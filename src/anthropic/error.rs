//! Failure taxonomy for model calls.
//!
//! The workflow retries transient failures (rate limit, timeout, connection,
//! server-side API errors) automatically up to a bound, then escalates to the
//! operator. Anything else is unexpected and gets a single offered retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnthropicError {
    /// HTTP 429. `retry_after_ms` comes from the Retry-After header when the
    /// server sends one.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The request exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Non-success HTTP status with the response body as the message.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Underlying network failure (DNS, refused connection, broken pipe).
    #[error("connection error: {0}")]
    Connection(String),

    /// The model responded but its output could not be parsed into the
    /// expected structure.
    #[error("failed to parse model output: {0}")]
    Parse(String),
}

impl AnthropicError {
    /// Transient failures are retried automatically with operator-mediated
    /// escalation; non-transient ones go straight to the unexpected-error
    /// path (one offered retry).
    pub fn is_transient(&self) -> bool {
        match self {
            AnthropicError::RateLimited { .. }
            | AnthropicError::Timeout
            | AnthropicError::Connection(_)
            | AnthropicError::ApiError { .. } => true,
            AnthropicError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for AnthropicError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnthropicError::Timeout
        } else {
            AnthropicError::Connection(err.to_string())
        }
    }
}
