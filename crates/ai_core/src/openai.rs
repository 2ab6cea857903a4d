//! OpenAI client for chat completions and the Assistants v2 API

use std::time::Duration;

use async_trait::async_trait;
use domain::ThreadId;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::OpenAiConfig;
use crate::error::InferenceError;
use crate::ports::{AssistantsApi, ChatCompletion};
use crate::types::{AssistantSpec, Run, ThreadMessage};

const ASSISTANTS_BETA: &str = "assistants=v2";

/// OpenAI API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
    api_key: SecretString,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Configuration` if the configuration is invalid
    /// or no API key is set.
    pub fn new(config: OpenAiConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;
        let api_key = config
            .require_api_key()
            .map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            chat_model = %config.chat_model,
            "Initialized OpenAI client"
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .post(self.api_url(endpoint))
            .bearer_auth(self.api_key.expose_secret())
    }

    fn beta_get(&self, endpoint: &str) -> RequestBuilder {
        self.client
            .get(self.api_url(endpoint))
            .bearer_auth(self.api_key.expose_secret())
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    fn beta_post(&self, endpoint: &str) -> RequestBuilder {
        self.post(endpoint).header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    /// Turn a non-success response into an error, preferring the API's
    /// own message
    async fn check(response: Response) -> Result<Response, InferenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "OpenAI request failed");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InferenceError::RateLimited);
        }

        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Status {status}: {body}"));
        Err(InferenceError::ServerError(message))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, InferenceError> {
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRun<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    #[instrument(skip(self, system, user), fields(model = %self.config.chat_model, prompt_len = user.len()))]
    async fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        debug!("Sending chat completion request");

        let response = self.post("chat/completions").json(&request).send().await?;
        let parsed: ChatResponse = Self::parse(response).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| InferenceError::InvalidResponse("Response contained no choices".into()))
    }

    fn model_name(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl AssistantsApi for OpenAiClient {
    #[instrument(skip(self, spec), fields(name = %spec.name, model = %spec.model))]
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String, InferenceError> {
        let response = self.beta_post("assistants").json(spec).send().await?;
        let created: IdObject = Self::parse(response).await?;
        info!(assistant_id = %created.id, "Created assistant");
        Ok(created.id)
    }

    #[instrument(skip(self))]
    async fn create_thread(&self) -> Result<ThreadId, InferenceError> {
        let response = self
            .beta_post("threads")
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let created: IdObject = Self::parse(response).await?;
        ThreadId::new(created.id).map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }

    #[instrument(skip(self, text), fields(thread = %thread, text_len = text.len()))]
    async fn add_message(&self, thread: &ThreadId, text: &str) -> Result<(), InferenceError> {
        let request = CreateMessage {
            role: "user",
            content: text,
        };
        let response = self
            .beta_post(&format!("threads/{thread}/messages"))
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(thread = %thread))]
    async fn create_run(
        &self,
        thread: &ThreadId,
        assistant_id: &str,
    ) -> Result<Run, InferenceError> {
        let response = self
            .beta_post(&format!("threads/{thread}/runs"))
            .json(&CreateRun { assistant_id })
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self), fields(thread = %thread))]
    async fn retrieve_run(&self, thread: &ThreadId, run_id: &str) -> Result<Run, InferenceError> {
        let response = self
            .beta_get(&format!("threads/{thread}/runs/{run_id}"))
            .send()
            .await?;
        Self::parse(response).await
    }

    #[instrument(skip(self), fields(thread = %thread))]
    async fn cancel_run(&self, thread: &ThreadId, run_id: &str) -> Result<(), InferenceError> {
        let response = self
            .beta_post(&format!("threads/{thread}/runs/{run_id}/cancel"))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(thread = %thread))]
    async fn list_messages(&self, thread: &ThreadId) -> Result<Vec<ThreadMessage>, InferenceError> {
        let response = self
            .beta_get(&format!("threads/{thread}/messages"))
            .query(&[("order", "desc")])
            .send()
            .await?;
        let list: MessageList = Self::parse(response).await?;
        Ok(list.data)
    }
}
