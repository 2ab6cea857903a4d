//! Assistant conversation handlers
//!
//! A `thread_id` continues an existing conversation; a missing or malformed
//! one starts a new thread. The thread used is returned in the body, or in
//! the `X-Thread-ID` header for audio replies.

use application::AssistantReply;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::Response,
};
use domain::VoiceProvider;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::ApiError,
    handlers::common::{
        AudioQuery, audio_attachment, first_valid_thread_id, parse_provider, read_audio_form,
        with_thread_header,
    },
    middleware::ValidatedJson,
    state::AppState,
};

const ASSISTANT_ERROR: &str = "Error getting assistant response";
const UPLOAD_ERROR: &str = "Error processing uploaded audio";

/// Assistant request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssistantRequest {
    /// Question for the assistant
    #[validate(length(min = 1, message = "must not be empty"))]
    #[schema(example = "What is the weather like today?")]
    pub text: String,

    /// Thread to continue; a malformed value defers to the query parameter
    #[serde(default, alias = "threadId")]
    #[schema(example = "thread_abc123")]
    pub thread_id: Option<String>,

    /// Synthesis provider for the audio endpoints
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "openai")]
    pub provider: Option<VoiceProvider>,
}

impl AssistantRequest {
    /// Valid body field first, then the query string
    fn thread_id<'a>(&'a self, query: &'a AudioQuery) -> Option<&'a str> {
        first_valid_thread_id([self.thread_id.as_deref(), query.thread_id.as_deref()])
    }

    fn provider(&self, query: &AudioQuery) -> Result<Option<VoiceProvider>, ApiError> {
        match self.provider {
            Some(provider) => Ok(Some(provider)),
            None => parse_provider(query.provider.as_deref()),
        }
    }
}

/// Assistant response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssistantResponse {
    /// Question as asked or transcribed
    pub question: String,
    /// Assistant answer
    pub response: String,
    /// Thread the turn was appended to
    #[schema(example = "thread_abc123")]
    pub thread_id: String,
}

impl From<AssistantReply> for AssistantResponse {
    fn from(reply: AssistantReply) -> Self {
        Self {
            question: reply.question,
            response: reply.response,
            thread_id: reply.thread_id.into_inner(),
        }
    }
}

/// Ask the assistant a text question
#[utoipa::path(
    post,
    path = "/assistant",
    tag = "assistant",
    params(AudioQuery),
    request_body = AssistantRequest,
    responses(
        (status = 200, description = "Assistant answer", body = AssistantResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Assistant run failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, request, query), fields(text_len = request.text.len()))]
pub async fn assistant(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    ValidatedJson(request): ValidatedJson<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let reply = state
        .assistant_service
        .ask(&request.text, request.thread_id(&query))
        .await
        .map_err(|e| ApiError::with_context(ASSISTANT_ERROR, e))?;

    Ok(Json(reply.into()))
}

/// Transcribe an uploaded question and ask the assistant
#[utoipa::path(
    post,
    path = "/assistant/upload",
    tag = "assistant",
    params(AudioQuery),
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Assistant answer", body = AssistantResponse),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Processing failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, query, multipart))]
pub async fn assistant_upload(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    multipart: Multipart,
) -> Result<Json<AssistantResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;
    let thread_id = form.thread_id(&query).map(ToString::to_string);

    let reply = state
        .pipeline_service
        .ask_by_voice(form.upload, thread_id.as_deref())
        .await
        .map_err(|e| ApiError::with_context(UPLOAD_ERROR, e))?;

    Ok(Json(reply.into()))
}

/// Ask the assistant a text question and return the answer as speech
#[utoipa::path(
    post,
    path = "/assistant/audio",
    tag = "assistant",
    params(AudioQuery),
    request_body = AssistantRequest,
    responses(
        (status = 200, description = "MP3 answer; thread in the X-Thread-ID header", content_type = "audio/mpeg"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Assistant run or synthesis failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, request, query), fields(text_len = request.text.len()))]
pub async fn assistant_audio(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    ValidatedJson(request): ValidatedJson<AssistantRequest>,
) -> Result<Response, ApiError> {
    let provider = request.provider(&query)?;

    let spoken = state
        .pipeline_service
        .ask_aloud(&request.text, request.thread_id(&query), provider)
        .await
        .map_err(|e| ApiError::with_context(ASSISTANT_ERROR, e))?;

    Ok(with_thread_header(
        audio_attachment(spoken.audio, "speech.mp3"),
        spoken.reply.thread_id.as_str(),
    ))
}

/// Transcribe an uploaded question, ask the assistant, and return speech
#[utoipa::path(
    post,
    path = "/assistant/upload/audio",
    tag = "assistant",
    params(AudioQuery),
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "MP3 answer; thread in the X-Thread-ID header", content_type = "audio/mpeg"),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Processing failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, query, multipart))]
pub async fn assistant_upload_audio(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_audio_form(multipart).await?;
    let provider = form.provider(&query)?;
    let thread_id = form.thread_id(&query).map(ToString::to_string);

    let spoken = state
        .pipeline_service
        .ask_by_voice_aloud(form.upload, thread_id.as_deref(), provider)
        .await
        .map_err(|e| ApiError::with_context(UPLOAD_ERROR, e))?;

    Ok(with_thread_header(
        audio_attachment(spoken.audio, "speech.mp3"),
        spoken.reply.thread_id.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ThreadId;

    #[test]
    fn request_accepts_camel_case_thread_id() {
        let request: AssistantRequest =
            serde_json::from_str(r#"{"text": "hi", "threadId": "thread_abc"}"#).unwrap();
        assert_eq!(request.thread_id.as_deref(), Some("thread_abc"));
    }

    #[test]
    fn body_thread_id_wins_over_query() {
        let request: AssistantRequest =
            serde_json::from_str(r#"{"text": "hi", "thread_id": "thread_body"}"#).unwrap();
        let query = AudioQuery {
            thread_id: Some("thread_query".to_string()),
            provider: None,
        };
        assert_eq!(request.thread_id(&query), Some("thread_body"));

        let request: AssistantRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(request.thread_id(&query), Some("thread_query"));
    }

    #[test]
    fn malformed_body_thread_id_does_not_hide_query() {
        let request: AssistantRequest =
            serde_json::from_str(r#"{"text": "hi", "thread_id": "not-a-thread"}"#).unwrap();
        let query = AudioQuery {
            thread_id: Some("thread_query".to_string()),
            provider: None,
        };
        assert_eq!(request.thread_id(&query), Some("thread_query"));
    }

    #[test]
    fn provider_falls_back_to_query() {
        let request: AssistantRequest = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        let query = AudioQuery {
            thread_id: None,
            provider: Some("openai".to_string()),
        };
        assert_eq!(request.provider(&query).unwrap(), Some(VoiceProvider::OpenAi));
    }

    #[test]
    fn response_from_reply() {
        let reply = AssistantReply {
            question: "q".to_string(),
            response: "a".to_string(),
            thread_id: ThreadId::new("thread_xyz").unwrap(),
        };
        let response = AssistantResponse::from(reply);
        assert_eq!(response.thread_id, "thread_xyz");
    }
}
