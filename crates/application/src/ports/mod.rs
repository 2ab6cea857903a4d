//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod inference_port;
mod speech_port;

pub use inference_port::{AssistantTurn, CompletionPort, ConversationPort};
#[cfg(test)]
pub use inference_port::{MockCompletionPort, MockConversationPort};
pub use speech_port::{AudioUpload, SpeechAudio, SynthesisPort, TranscriptionPort};
#[cfg(test)]
pub use speech_port::{MockSynthesisPort, MockTranscriptionPort};
