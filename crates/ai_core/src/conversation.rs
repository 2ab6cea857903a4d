//! Conversation gateway
//!
//! Drives one assistant turn on a provider-held thread: append the user
//! message, start a run, poll it to a terminal state within a bounded
//! time, then read the newest assistant reply.
//!
//! The assistant itself is resolved once per process. A configured id is
//! used as is; otherwise an assistant is created on the first turn and the
//! id is kept for every later turn.

use std::sync::Arc;
use std::time::Duration;

use domain::ThreadId;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::config::OpenAiConfig;
use crate::error::InferenceError;
use crate::ports::{AssistantsApi, RunClock, TokioClock};
use crate::types::{AssistantSpec, MessageRole, ThreadMessage};

/// Reply text used when a completed run left no assistant message
pub const NO_RESPONSE_MESSAGE: &str = "No response received from the assistant.";

/// Result of one conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub response: String,
    pub thread_id: ThreadId,
}

/// Assistant conversation entry point used by the application layer
#[derive(Clone)]
pub struct ConversationGateway {
    api: Arc<dyn AssistantsApi>,
    clock: Arc<dyn RunClock>,
    assistant: AssistantSpec,
    assistant_id: Arc<OnceCell<String>>,
    poll_interval: Duration,
    run_timeout: Duration,
}

impl std::fmt::Debug for ConversationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationGateway")
            .field("assistant", &self.assistant)
            .field("assistant_id", &self.assistant_id.get())
            .field("poll_interval", &self.poll_interval)
            .field("run_timeout", &self.run_timeout)
            .finish_non_exhaustive()
    }
}

impl ConversationGateway {
    /// Create a gateway using the tokio timer
    pub fn new(api: Arc<dyn AssistantsApi>, config: &OpenAiConfig) -> Self {
        let assistant_id = config.configured_assistant_id().map(str::to_string);
        info!(
            assistant_id = ?assistant_id,
            poll_interval_ms = config.poll_interval_ms,
            run_timeout_secs = config.run_timeout_secs,
            "Initialized conversation gateway"
        );

        Self {
            api,
            clock: Arc::new(TokioClock),
            assistant: AssistantSpec {
                name: config.assistant_name.clone(),
                instructions: config.assistant_instructions.clone(),
                model: config.assistant_model.clone(),
            },
            assistant_id: Arc::new(OnceCell::new_with(assistant_id)),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            run_timeout: Duration::from_secs(config.run_timeout_secs),
        }
    }

    /// Replace the time source of the poll loop
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn RunClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return `thread` unchanged, or create a new thread when absent
    ///
    /// # Errors
    ///
    /// Returns the provider error if thread creation fails.
    #[instrument(skip(self))]
    pub async fn ensure_thread(&self, thread: Option<ThreadId>) -> Result<ThreadId, InferenceError> {
        if let Some(id) = thread {
            return Ok(id);
        }

        let id = self.api.create_thread().await?;
        info!(thread_id = %id, "Created conversation thread");
        Ok(id)
    }

    /// Run one turn of the conversation on `thread`
    ///
    /// # Errors
    ///
    /// - [`InferenceError::RunFailed`] if the run ends in a failure status
    /// - [`InferenceError::RunTimeout`] if the run does not finish in time;
    ///   the run is cancelled first
    /// - provider errors from any thread or run call
    #[instrument(skip(self, thread, text), fields(thread_id = %thread, text_len = text.len()))]
    pub async fn send_turn(
        &self,
        thread: ThreadId,
        text: &str,
    ) -> Result<TurnReply, InferenceError> {
        let assistant_id = self.assistant_id().await?;

        self.api.add_message(&thread, text).await?;
        let run = self.api.create_run(&thread, assistant_id).await?;
        debug!(run_id = %run.id, "Started run");

        self.await_run(&thread, &run.id).await?;

        let messages = self.api.list_messages(&thread).await?;
        let response = latest_assistant_text(&messages).unwrap_or_else(|| {
            warn!(thread_id = %thread, "Completed run left no assistant message");
            NO_RESPONSE_MESSAGE.to_string()
        });

        Ok(TurnReply {
            response,
            thread_id: thread,
        })
    }

    async fn assistant_id(&self) -> Result<&str, InferenceError> {
        self.assistant_id
            .get_or_try_init(|| async { self.api.create_assistant(&self.assistant).await })
            .await
            .map(String::as_str)
    }

    /// Poll until the run completes, fails, or exceeds the timeout
    async fn await_run(&self, thread: &ThreadId, run_id: &str) -> Result<(), InferenceError> {
        let start = self.clock.now();
        let mut polls = 0_u32;

        loop {
            let run = self.api.retrieve_run(thread, run_id).await?;
            polls += 1;

            if run.status.is_success() {
                debug!(run_id, polls, "Run completed");
                return Ok(());
            }
            if run.status.is_terminal_failure() {
                warn!(run_id, status = %run.status, "Run ended without a reply");
                return Err(InferenceError::RunFailed(run.status));
            }

            let waited = self.clock.now().saturating_duration_since(start);
            if waited >= self.run_timeout {
                warn!(run_id, polls, waited_secs = waited.as_secs(), "Run timed out, cancelling");
                if let Err(e) = self.api.cancel_run(thread, run_id).await {
                    warn!(run_id, error = %e, "Failed to cancel run");
                }
                return Err(InferenceError::RunTimeout {
                    waited_secs: waited.as_secs(),
                });
            }

            self.clock.sleep(self.poll_interval).await;
        }
    }
}

/// Text of the newest assistant message, given messages newest first
fn latest_assistant_text(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == MessageRole::Assistant)
        .map(ThreadMessage::text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageContent, Run, RunStatus, TextContent};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Clock that only advances when slept on
    struct ManualClock {
        origin: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }
    }

    #[async_trait]
    impl RunClock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + *self.offset.lock()
        }

        async fn sleep(&self, duration: Duration) {
            *self.offset.lock() += duration;
        }
    }

    /// Scripted assistants API
    #[derive(Default)]
    struct ScriptedApi {
        statuses: Mutex<VecDeque<RunStatus>>,
        messages: Vec<ThreadMessage>,
        fail_cancel: bool,
        assistants_created: AtomicUsize,
        threads_created: AtomicUsize,
        polls: AtomicUsize,
        cancels: AtomicUsize,
        run_assistants: Mutex<Vec<String>>,
        added: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn with_statuses(statuses: impl IntoIterator<Item = RunStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into_iter().collect()),
                messages: vec![
                    message(MessageRole::Assistant, &["Hi ", "there"]),
                    message(MessageRole::User, &["hello"]),
                ],
                ..Self::default()
            }
        }
    }

    fn message(role: MessageRole, parts: &[&str]) -> ThreadMessage {
        ThreadMessage {
            role,
            content: parts
                .iter()
                .map(|p| MessageContent::Text {
                    text: TextContent {
                        value: (*p).to_string(),
                    },
                })
                .collect(),
        }
    }

    #[async_trait]
    impl AssistantsApi for ScriptedApi {
        async fn create_assistant(&self, _spec: &AssistantSpec) -> Result<String, InferenceError> {
            self.assistants_created.fetch_add(1, Ordering::SeqCst);
            Ok("asst_created".to_string())
        }

        async fn create_thread(&self) -> Result<ThreadId, InferenceError> {
            self.threads_created.fetch_add(1, Ordering::SeqCst);
            Ok(ThreadId::new("thread_new").unwrap())
        }

        async fn add_message(&self, _thread: &ThreadId, text: &str) -> Result<(), InferenceError> {
            self.added.lock().push(text.to_string());
            Ok(())
        }

        async fn create_run(
            &self,
            _thread: &ThreadId,
            assistant_id: &str,
        ) -> Result<Run, InferenceError> {
            self.run_assistants.lock().push(assistant_id.to_string());
            Ok(Run {
                id: "run_1".to_string(),
                status: RunStatus::Queued,
            })
        }

        async fn retrieve_run(&self, _thread: &ThreadId, run_id: &str) -> Result<Run, InferenceError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let status = self
                .statuses
                .lock()
                .pop_front()
                .unwrap_or(RunStatus::InProgress);
            Ok(Run {
                id: run_id.to_string(),
                status,
            })
        }

        async fn cancel_run(&self, _thread: &ThreadId, _run_id: &str) -> Result<(), InferenceError> {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            if self.fail_cancel {
                return Err(InferenceError::ServerError("already finished".to_string()));
            }
            Ok(())
        }

        async fn list_messages(&self, _thread: &ThreadId) -> Result<Vec<ThreadMessage>, InferenceError> {
            Ok(self.messages.clone())
        }
    }

    fn config() -> OpenAiConfig {
        OpenAiConfig {
            assistant_id: Some("asst_configured".to_string()),
            poll_interval_ms: 1000,
            run_timeout_secs: 3,
            ..OpenAiConfig::default()
        }
    }

    fn gateway(api: Arc<ScriptedApi>, config: &OpenAiConfig) -> ConversationGateway {
        ConversationGateway::new(api, config).with_clock(Arc::new(ManualClock::new()))
    }

    fn thread() -> ThreadId {
        ThreadId::new("thread_abc").unwrap()
    }

    mod ensure_thread {
        use super::*;

        #[tokio::test]
        async fn returns_existing_id_unchanged() {
            let api = Arc::new(ScriptedApi::default());
            let gateway = gateway(api.clone(), &config());

            let id = gateway.ensure_thread(Some(thread())).await.unwrap();

            assert_eq!(id, thread());
            assert_eq!(api.threads_created.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn creates_thread_when_absent() {
            let api = Arc::new(ScriptedApi::default());
            let gateway = gateway(api.clone(), &config());

            let id = gateway.ensure_thread(None).await.unwrap();

            assert_eq!(id.as_str(), "thread_new");
            assert_eq!(api.threads_created.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn invalid_id_parsed_leniently_creates_thread() {
            let api = Arc::new(ScriptedApi::default());
            let gateway = gateway(api.clone(), &config());

            let id = gateway
                .ensure_thread(ThreadId::parse_lenient(Some("not-a-thread")))
                .await
                .unwrap();

            assert_eq!(id.as_str(), "thread_new");
            assert_eq!(api.threads_created.load(Ordering::SeqCst), 1);
        }
    }

    mod poll_loop {
        use super::*;

        #[tokio::test]
        async fn completes_after_n_plus_one_polls_without_cancel() {
            let api = Arc::new(ScriptedApi::with_statuses([
                RunStatus::Queued,
                RunStatus::InProgress,
                RunStatus::Completed,
            ]));
            let gateway = gateway(api.clone(), &config());

            let reply = gateway.send_turn(thread(), "hello").await.unwrap();

            assert_eq!(reply.response, "Hi there");
            assert_eq!(reply.thread_id, thread());
            assert_eq!(api.polls.load(Ordering::SeqCst), 3);
            assert_eq!(api.cancels.load(Ordering::SeqCst), 0);
            assert_eq!(api.added.lock().as_slice(), ["hello"]);
        }

        #[tokio::test]
        async fn timeout_cancels_exactly_once() {
            let api = Arc::new(ScriptedApi::with_statuses(Vec::new()));
            let gateway = gateway(api.clone(), &config());

            let result = gateway.send_turn(thread(), "hello").await;

            assert!(matches!(
                result,
                Err(InferenceError::RunTimeout { waited_secs: 3 })
            ));
            assert_eq!(api.polls.load(Ordering::SeqCst), 4);
            assert_eq!(api.cancels.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn cancel_failure_still_reports_timeout() {
            let api = Arc::new(ScriptedApi {
                fail_cancel: true,
                ..ScriptedApi::with_statuses(Vec::new())
            });
            let gateway = gateway(api.clone(), &config());

            let result = gateway.send_turn(thread(), "hello").await;

            assert!(matches!(result, Err(InferenceError::RunTimeout { .. })));
            assert_eq!(api.cancels.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn failed_run_is_reported_without_cancel() {
            let api = Arc::new(ScriptedApi::with_statuses([
                RunStatus::InProgress,
                RunStatus::Failed,
            ]));
            let gateway = gateway(api.clone(), &config());

            let result = gateway.send_turn(thread(), "hello").await;

            assert!(matches!(
                result,
                Err(InferenceError::RunFailed(RunStatus::Failed))
            ));
            assert_eq!(api.cancels.load(Ordering::SeqCst), 0);
        }

        #[tokio::test]
        async fn incomplete_run_is_a_failure() {
            let api = Arc::new(ScriptedApi::with_statuses([RunStatus::Incomplete]));
            let gateway = gateway(api, &config());

            let result = gateway.send_turn(thread(), "hello").await;

            assert!(matches!(
                result,
                Err(InferenceError::RunFailed(RunStatus::Incomplete))
            ));
        }

        #[tokio::test]
        async fn requires_action_keeps_polling() {
            let api = Arc::new(ScriptedApi::with_statuses([
                RunStatus::RequiresAction,
                RunStatus::Cancelling,
                RunStatus::Completed,
            ]));
            let gateway = gateway(api.clone(), &config());

            assert!(gateway.send_turn(thread(), "hello").await.is_ok());
            assert_eq!(api.polls.load(Ordering::SeqCst), 3);
        }
    }

    mod replies {
        use super::*;

        #[tokio::test]
        async fn no_assistant_message_yields_sentinel() {
            let api = Arc::new(ScriptedApi {
                messages: vec![message(MessageRole::User, &["hello"])],
                ..ScriptedApi::with_statuses([RunStatus::Completed])
            });
            let gateway = gateway(api, &config());

            let reply = gateway.send_turn(thread(), "hello").await.unwrap();

            assert_eq!(reply.response, NO_RESPONSE_MESSAGE);
        }

        #[tokio::test]
        async fn newest_assistant_message_wins() {
            let api = Arc::new(ScriptedApi {
                messages: vec![
                    message(MessageRole::User, &["second question"]),
                    message(MessageRole::Assistant, &["newest"]),
                    message(MessageRole::Assistant, &["older"]),
                ],
                ..ScriptedApi::with_statuses([RunStatus::Completed])
            });
            let gateway = gateway(api, &config());

            let reply = gateway.send_turn(thread(), "q").await.unwrap();

            assert_eq!(reply.response, "newest");
        }
    }

    mod bootstrap {
        use super::*;

        #[tokio::test]
        async fn configured_assistant_is_used_without_creation() {
            let api = Arc::new(ScriptedApi::with_statuses([RunStatus::Completed]));
            let gateway = gateway(api.clone(), &config());

            gateway.send_turn(thread(), "hello").await.unwrap();

            assert_eq!(api.assistants_created.load(Ordering::SeqCst), 0);
            assert_eq!(api.run_assistants.lock().as_slice(), ["asst_configured"]);
        }

        #[tokio::test]
        async fn assistant_is_created_once_per_gateway() {
            let api = Arc::new(ScriptedApi::with_statuses([
                RunStatus::Completed,
                RunStatus::Completed,
            ]));
            let config = OpenAiConfig {
                assistant_id: None,
                ..config()
            };
            let gateway = gateway(api.clone(), &config);
            let clone = gateway.clone();

            gateway.send_turn(thread(), "one").await.unwrap();
            clone.send_turn(thread(), "two").await.unwrap();

            assert_eq!(api.assistants_created.load(Ordering::SeqCst), 1);
            assert_eq!(
                api.run_assistants.lock().as_slice(),
                ["asst_created", "asst_created"]
            );
        }
    }
}
