//! Port definitions for the completion and assistant gateways
//!
//! Defines the traits (ports) that provider adapters must implement.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::ThreadId;

use crate::error::InferenceError;
use crate::types::{AssistantSpec, Run, ThreadMessage};

/// Single-turn chat completion
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send one system instruction and one user message, returning the
    /// first choice's content
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError>;

    /// Model used for completions
    fn model_name(&self) -> &str;
}

/// Thread and run operations of an assistant API
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Create an assistant and return its id
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String, InferenceError>;

    async fn create_thread(&self) -> Result<ThreadId, InferenceError>;

    /// Append a user message to a thread
    async fn add_message(&self, thread: &ThreadId, text: &str) -> Result<(), InferenceError>;

    async fn create_run(&self, thread: &ThreadId, assistant_id: &str)
    -> Result<Run, InferenceError>;

    async fn retrieve_run(&self, thread: &ThreadId, run_id: &str) -> Result<Run, InferenceError>;

    async fn cancel_run(&self, thread: &ThreadId, run_id: &str) -> Result<(), InferenceError>;

    /// Messages on a thread, newest first
    async fn list_messages(&self, thread: &ThreadId) -> Result<Vec<ThreadMessage>, InferenceError>;
}

/// Time source for the run poll loop
#[async_trait]
pub trait RunClock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// [`RunClock`] backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl RunClock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
