//! Infrastructure adapters
//!
//! Adapters connect application ports to the speech and inference gateways.

mod inference_adapter;
mod speech_adapter;

pub use inference_adapter::{CompletionAdapter, ConversationAdapter};
pub use speech_adapter::{SynthesisAdapter, TranscriptionAdapter};
