//! Assistant service - Conversation turns on provider-held threads

use std::{fmt, sync::Arc};

use domain::ThreadId;
use tracing::{debug, info, instrument};

use crate::{error::ApplicationError, ports::ConversationPort};

/// Reply to one assistant question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// The question as asked
    pub question: String,
    /// Assistant reply text
    pub response: String,
    /// Thread to pass back on the next turn
    pub thread_id: ThreadId,
}

/// Service for assistant conversations
pub struct AssistantService {
    conversation: Arc<dyn ConversationPort>,
}

impl fmt::Debug for AssistantService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantService").finish_non_exhaustive()
    }
}

impl AssistantService {
    /// Create a new assistant service
    pub fn new(conversation: Arc<dyn ConversationPort>) -> Self {
        Self { conversation }
    }

    /// Ask the assistant `question`, continuing `thread_id` when it names a
    /// valid thread
    ///
    /// A missing, blank, or malformed thread id starts a new thread.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn ask(
        &self,
        question: &str,
        thread_id: Option<&str>,
    ) -> Result<AssistantReply, ApplicationError> {
        let requested = ThreadId::parse_lenient(thread_id);
        if requested.is_none() && thread_id.is_some_and(|id| !id.trim().is_empty()) {
            info!("Ignoring malformed thread id, starting a new thread");
        }

        let thread = self.conversation.ensure_thread(requested).await?;
        let turn = self.conversation.send_turn(thread, question).await?;

        debug!(thread_id = %turn.thread_id, response_len = turn.response.len(), "Assistant replied");

        Ok(AssistantReply {
            question: question.to_string(),
            response: turn.response,
            thread_id: turn.thread_id,
        })
    }
}
