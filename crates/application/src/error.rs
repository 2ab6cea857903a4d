//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Transcription or synthesis failed
    #[error("Speech error: {0}")]
    Speech(String),

    /// Completion or assistant run failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// A remote resource could not be fetched
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Rate limit exceeded at a provider
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error came from a provider rather than from the caller
    /// or the service itself
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Speech(_) | Self::Inference(_) | Self::ExternalService(_) | Self::RateLimited
        )
    }
}
