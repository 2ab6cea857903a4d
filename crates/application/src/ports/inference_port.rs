//! Inference ports - Interfaces for chat completion and assistant threads

use async_trait::async_trait;
use domain::ThreadId;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Outcome of one assistant turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    /// Assistant reply text
    pub response: String,
    /// Thread the turn ran on
    pub thread_id: ThreadId,
}

/// Port for one-shot chat completion
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Complete `prompt` with the configured system instruction
    async fn complete(&self, prompt: &str) -> Result<String, ApplicationError>;
}

/// Port for provider-held assistant conversations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationPort: Send + Sync {
    /// Return `thread` unchanged, or create a new thread when absent
    async fn ensure_thread(&self, thread: Option<ThreadId>) -> Result<ThreadId, ApplicationError>;

    /// Run one turn on `thread` and return the assistant's reply
    async fn send_turn(&self, thread: ThreadId, text: &str)
    -> Result<AssistantTurn, ApplicationError>;
}
