//! Application state shared across handlers

use std::sync::Arc;

use application::{AssistantService, ChatService, SpeechService, VoicePipelineService};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Transcription and synthesis
    pub speech_service: Arc<SpeechService>,
    /// Single-turn completion
    pub chat_service: Arc<ChatService>,
    /// Threaded assistant conversations
    pub assistant_service: Arc<AssistantService>,
    /// Combined speak, think, respond flows
    pub pipeline_service: Arc<VoicePipelineService>,
}

impl AppState {
    /// Wire the services around one set of shared instances
    pub fn new(
        speech_service: Arc<SpeechService>,
        chat_service: Arc<ChatService>,
        assistant_service: Arc<AssistantService>,
    ) -> Self {
        let pipeline_service = Arc::new(VoicePipelineService::new(
            Arc::clone(&speech_service),
            Arc::clone(&chat_service),
            Arc::clone(&assistant_service),
        ));

        Self {
            speech_service,
            chat_service,
            assistant_service,
            pipeline_service,
        }
    }
}
