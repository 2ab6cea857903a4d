//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Thread identifier does not carry the provider's `thread_` prefix
    #[error("Invalid thread id: {0}")]
    InvalidThreadId(String),

    /// Unknown voice synthesis provider name
    #[error("Invalid voice provider: {0}. Use 'elevenlabs' or 'openai'")]
    InvalidVoiceProvider(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
