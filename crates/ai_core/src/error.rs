//! Inference errors

use thiserror::Error;

use crate::types::RunStatus;

/// Errors that can occur during completion or assistant runs
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the provider
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the provider failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP request hit the client timeout
    #[error("Inference request timed out: {0}")]
    Timeout(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider answered with an error status
    #[error("Server error: {0}")]
    ServerError(String),

    /// Chat completion failed
    #[error("Completion failed: {0}")]
    Completion(String),

    /// Assistant run ended in a terminal failure status
    #[error("Run ended with status: {0}")]
    RunFailed(RunStatus),

    /// Assistant run did not finish in time
    #[error("Run did not complete within {waited_secs} seconds")]
    RunTimeout { waited_secs: u64 },

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
