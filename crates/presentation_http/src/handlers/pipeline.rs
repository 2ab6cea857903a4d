//! Speak, think, respond handlers

use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::ApiError,
    handlers::common::{AudioQuery, audio_attachment, read_audio_form},
    state::AppState,
};

const PIPELINE_ERROR: &str = "Error processing STT-ChatGPT-TTS";

/// Pipeline result without synthesized audio
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PipelineJsonResponse {
    /// Transcribed question
    pub text: String,
    /// Model answer
    pub response: String,
    /// Placeholder location for the answer audio; nothing is stored there
    #[schema(example = "/stt-chatgpt-tts/audio/0b6f1f9e-3c1a-4f4e-9a57-2f1c1d5e8a10.mp3")]
    pub audio_url: String,
}

/// Placeholder audio location returned by the JSON pipeline
fn placeholder_audio_url() -> String {
    format!("/stt-chatgpt-tts/audio/{}.mp3", Uuid::new_v4())
}

/// Transcribe an uploaded question, complete it, and return the answer as speech
#[utoipa::path(
    post,
    path = "/stt-chatgpt-tts/upload",
    tag = "pipeline",
    params(AudioQuery),
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "MP3 attachment named response.mp3", content_type = "audio/mpeg"),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Processing failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, query, multipart))]
pub async fn stt_chatgpt_tts_upload(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_audio_form(multipart).await?;
    let provider = form.provider(&query)?;

    let (_, audio) = state
        .pipeline_service
        .transcribe_chat_and_speak(form.upload, provider)
        .await
        .map_err(|e| ApiError::with_context(PIPELINE_ERROR, e))?;

    Ok(audio_attachment(audio, "response.mp3"))
}

/// Transcribe an uploaded question and complete it, returning JSON
///
/// No audio is synthesized; `audio_url` is a placeholder.
#[utoipa::path(
    post,
    path = "/stt-chatgpt-tts/upload/json",
    tag = "pipeline",
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcript, answer, and placeholder audio URL", body = PipelineJsonResponse),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Processing failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn stt_chatgpt_tts_upload_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PipelineJsonResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;

    let exchange = state
        .pipeline_service
        .transcribe_and_chat(form.upload)
        .await
        .map_err(|e| ApiError::with_context(PIPELINE_ERROR, e))?;

    Ok(Json(PipelineJsonResponse {
        text: exchange.text,
        response: exchange.response,
        audio_url: placeholder_audio_url(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_url_shape() {
        let url = placeholder_audio_url();
        let id = url
            .strip_prefix("/stt-chatgpt-tts/audio/")
            .and_then(|rest| rest.strip_suffix(".mp3"))
            .unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn placeholder_urls_are_unique() {
        assert_ne!(placeholder_audio_url(), placeholder_audio_url());
    }
}
