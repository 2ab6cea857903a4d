//! Chat completion handlers

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::ApiError, handlers::common::read_audio_form, middleware::ValidatedJson,
    state::AppState,
};

/// Chat request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    /// User message
    #[validate(length(min = 1, message = "must not be empty"))]
    #[schema(example = "What is the capital of France?")]
    pub text: String,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    /// Model answer
    pub response: String,
}

/// Chat response for an uploaded question
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatUploadResponse {
    /// Model answer
    pub response: String,
    /// Transcribed question
    pub text: String,
}

/// Complete a text message
#[utoipa::path(
    post,
    path = "/chatgpt",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model answer", body = ChatResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Completion failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
pub async fn chatgpt(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .chat_service
        .chat(&request.text)
        .await
        .map_err(|e| ApiError::with_context("Error getting ChatGPT response", e))?;

    Ok(Json(ChatResponse { response }))
}

/// Transcribe an uploaded question and complete it
#[utoipa::path(
    post,
    path = "/chatgpt/upload",
    tag = "chat",
    request_body(content = crate::handlers::common::AudioUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcript and model answer", body = ChatUploadResponse),
        (status = 400, description = "Not an audio upload", body = crate::error::ErrorResponse),
        (status = 500, description = "Processing failed", body = crate::error::ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn chatgpt_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ChatUploadResponse>, ApiError> {
    let form = read_audio_form(multipart).await?;

    let exchange = state
        .pipeline_service
        .transcribe_and_chat(form.upload)
        .await
        .map_err(|e| ApiError::with_context("Error processing uploaded audio", e))?;

    Ok(Json(ChatUploadResponse {
        response: exchange.response,
        text: exchange.text,
    }))
}
