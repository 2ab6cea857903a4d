//! Text-to-speech and speech-to-text handlers

use axum::{
    Json,
    extract::{Multipart, State},
    response::Response,
};
use domain::VoiceProvider;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::ApiError,
    handlers::common::{audio_attachment, read_audio_form},
    middleware::ValidatedJson,
    state::AppState,
};

/// Text-to-speech request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TextToSpeechRequest {
    /// Text to convert to speech
    #[validate(length(min = 1, message = "must not be empty"))]
    #[schema(example = "Hello, this is a sample text to convert to speech.")]
    pub text: String,

    /// Synthesis provider; the configured default when absent
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "elevenlabs")]
    pub provider: Option<VoiceProvider>,
}

/// Remote audio transcription request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AudioUrlRequest {
    /// URL of the audio file to transcribe
    #[validate(url(message = "must be a valid URL"))]
    #[schema(example = "https://example.com/audio/question.mp3")]
    pub audio_url: String,
}

/// Transcription response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranscriptionResponse {
    /// Transcribed text
    pub text: String,
}

/// Convert text to speech
#[utoipa::path(
    post,
    path = "/text-to-speech",
    tag = "speech",
    request_body = TextToSpeechRequest,
    responses(
        (status = 200, description = "MP3 attachment named speech.mp3", content_type = "audio/mpeg"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Synthesis failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(text_len = request.text.len(), provider = ?request.provider))]
pub async fn text_to_speech(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TextToSpeechRequest>,
) -> Result<Response, ApiError> {
    let audio = state
        .speech_service
        .synthesize(&request.text, request.provider)
        .await
        .map_err(|e| ApiError::with_context("Error converting text to speech", e))?;

    Ok(audio_attachment(audio, "speech.mp3"))
}

/// Transcribe the audio file at a URL
#[utoipa::path(
    post,
    path = "/speech-to-text/audio-url",
    tag = "speech",
    request_body = AudioUrlRequest,
    responses(
        (status = 200, description = "Transcribed text", body = TranscriptionResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Transcription failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn speech_to_text_from_url(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AudioUrlRequest>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let text = state
        .speech_service
        .transcribe_url(&request.audio_url)
        .await
        .map_err(|e| ApiError::with_context("Error converting speech to text", e))?;

    Ok(Json(TranscriptionResponse { text }))
}

/// Transcribe an uploaded audio file
#[utoipa::path(
    post,
    path = "/speech-to-text/upload",
    tag = "speech",
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcribed text", body = TranscriptionResponse),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Transcription failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn speech_to_text_from_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;

    let text = state
        .speech_service
        .transcribe_upload(form.upload)
        .await
        .map_err(|e| ApiError::with_context("Error converting uploaded audio to text", e))?;

    Ok(Json(TranscriptionResponse { text }))
}
