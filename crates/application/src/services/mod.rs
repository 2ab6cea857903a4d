//! Application services - Use case implementations

mod assistant_service;
mod chat_service;
mod speech_service;
mod voice_pipeline_service;

pub use assistant_service::{AssistantReply, AssistantService};
pub use chat_service::ChatService;
pub use speech_service::SpeechService;
pub use voice_pipeline_service::{SpokenAssistantReply, SpokenExchange, VoicePipelineService};
