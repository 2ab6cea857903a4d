//! Inference adapters - Implement the inference ports using ai_core gateways

use std::sync::Arc;

use ai_core::{
    CompletionGateway, ConversationGateway, InferenceError, OpenAiClient, OpenAiConfig,
};
use application::{
    error::ApplicationError,
    ports::{AssistantTurn, CompletionPort, ConversationPort},
};
use async_trait::async_trait;
use domain::ThreadId;
use tracing::instrument;

/// Convert ai_core error to application error
fn map_error(e: InferenceError) -> ApplicationError {
    match e {
        InferenceError::RateLimited => ApplicationError::RateLimited,
        InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
        InferenceError::ConnectionFailed(_) | InferenceError::Timeout(_) => {
            ApplicationError::ExternalService(e.to_string())
        },
        other => ApplicationError::Inference(other.to_string()),
    }
}

/// Adapter binding [`CompletionPort`] to the completion gateway
#[derive(Debug, Clone)]
pub struct CompletionAdapter {
    gateway: CompletionGateway,
}

impl CompletionAdapter {
    pub const fn new(gateway: CompletionGateway) -> Self {
        Self { gateway }
    }

    /// Build the gateway on an OpenAI client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no API key is set.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, ApplicationError> {
        let client = OpenAiClient::new(config.clone()).map_err(map_error)?;
        Ok(Self::new(CompletionGateway::new(
            Arc::new(client),
            config.system_prompt.clone(),
        )))
    }
}

#[async_trait]
impl CompletionPort for CompletionAdapter {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ApplicationError> {
        self.gateway.complete(prompt).await.map_err(map_error)
    }
}

/// Adapter binding [`ConversationPort`] to the conversation gateway
#[derive(Debug, Clone)]
pub struct ConversationAdapter {
    gateway: ConversationGateway,
}

impl ConversationAdapter {
    pub const fn new(gateway: ConversationGateway) -> Self {
        Self { gateway }
    }

    /// Build the gateway on an OpenAI client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no API key is set.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, ApplicationError> {
        let client = OpenAiClient::new(config.clone()).map_err(map_error)?;
        Ok(Self::new(ConversationGateway::new(Arc::new(client), config)))
    }
}

#[async_trait]
impl ConversationPort for ConversationAdapter {
    async fn ensure_thread(&self, thread: Option<ThreadId>) -> Result<ThreadId, ApplicationError> {
        self.gateway.ensure_thread(thread).await.map_err(map_error)
    }

    #[instrument(skip(self, text), fields(thread_id = %thread, text_len = text.len()))]
    async fn send_turn(
        &self,
        thread: ThreadId,
        text: &str,
    ) -> Result<AssistantTurn, ApplicationError> {
        let reply = self
            .gateway
            .send_turn(thread, text)
            .await
            .map_err(map_error)?;

        Ok(AssistantTurn {
            response: reply.response,
            thread_id: reply.thread_id,
        })
    }
}
