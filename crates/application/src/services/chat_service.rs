//! Chat service - Single-turn completion

use std::{fmt, sync::Arc, time::Instant};

use tracing::{debug, instrument};

use crate::{error::ApplicationError, ports::CompletionPort};

/// Service for stateless chat completion
pub struct ChatService {
    completion: Arc<dyn CompletionPort>,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService").finish_non_exhaustive()
    }
}

impl ChatService {
    /// Create a new chat service
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Handle a single chat message
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn chat(&self, message: &str) -> Result<String, ApplicationError> {
        let start = Instant::now();

        let response = self.completion.complete(message).await?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            response_len = response.len(),
            latency_ms, "Chat response generated"
        );

        Ok(response)
    }
}
