//! Completion gateway
//!
//! Relays one user prompt, preceded by the configured system instruction,
//! to a chat-completion model.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::InferenceError;
use crate::ports::ChatCompletion;

/// Chat completion entry point used by the application layer
#[derive(Clone)]
pub struct CompletionGateway {
    engine: Arc<dyn ChatCompletion>,
    system_prompt: String,
}

impl std::fmt::Debug for CompletionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGateway")
            .field("model", &self.engine.model_name())
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl CompletionGateway {
    pub fn new(engine: Arc<dyn ChatCompletion>, system_prompt: impl Into<String>) -> Self {
        Self {
            engine,
            system_prompt: system_prompt.into(),
        }
    }

    /// Complete `prompt` and return the model's reply
    ///
    /// # Errors
    ///
    /// Every provider failure is reported as [`InferenceError::Completion`]
    /// carrying the provider message.
    #[instrument(skip(self, prompt), fields(model = %self.engine.model_name(), prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let reply = self
            .engine
            .complete(&self.system_prompt, prompt)
            .await
            .map_err(|e| match e {
                InferenceError::Completion(_) => e,
                other => InferenceError::Completion(other.to_string()),
            })?;

        debug!(reply_len = reply.len(), "Completion received");
        Ok(reply)
    }
}
