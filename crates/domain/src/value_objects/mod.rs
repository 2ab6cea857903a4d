//! Value Objects - Immutable, identity-less domain primitives

mod thread_id;
mod voice_provider;

pub use thread_id::ThreadId;
pub use voice_provider::VoiceProvider;
