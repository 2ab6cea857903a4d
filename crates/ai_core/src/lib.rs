//! AI Core - Chat completion and assistant conversations
//!
//! Provides the text-facing gateways of the service:
//! - `CompletionGateway` - One-shot chat completion with a fixed system prompt
//! - `ConversationGateway` - Assistant turns on provider-held threads, with a
//!   bounded run poll loop
//!
//! Both gateways talk to the provider through the traits in `ports`;
//! `OpenAiClient` implements them against the OpenAI HTTP API.

pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod openai;
pub mod ports;
pub mod types;

pub use completion::CompletionGateway;
pub use config::OpenAiConfig;
pub use conversation::{ConversationGateway, NO_RESPONSE_MESSAGE, TurnReply};
pub use error::InferenceError;
pub use openai::OpenAiClient;
pub use ports::{AssistantsApi, ChatCompletion, RunClock, TokioClock};
pub use types::{AssistantSpec, MessageRole, Run, RunStatus, ThreadMessage};
