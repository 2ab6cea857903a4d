//! OpenAPI documentation
//!
//! Serves the generated document at `/api-docs/openapi.json` and Swagger UI
//! at `/swagger-ui`.

// utoipa derive output trips this lint
#![allow(clippy::needless_for_each)]

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{handlers, state::AppState};

/// OpenAPI documentation for the voice gateway
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voicegate API",
        description = "Speech-to-text, text-to-speech, chat completion, and assistant conversations behind one HTTP API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "speech", description = "Text-to-speech and speech-to-text"),
        (name = "chat", description = "Single-turn chat completion"),
        (name = "assistant", description = "Threaded assistant conversations"),
        (name = "pipeline", description = "Speech in, completion, speech out")
    ),
    paths(
        handlers::health::health_check,
        handlers::speech::text_to_speech,
        handlers::speech::speech_to_text_from_url,
        handlers::speech::speech_to_text_from_upload,
        handlers::chatgpt::chatgpt,
        handlers::chatgpt::chatgpt_upload,
        handlers::assistant::assistant,
        handlers::assistant::assistant_upload,
        handlers::assistant::assistant_audio,
        handlers::assistant::assistant_upload_audio,
        handlers::pipeline::stt_chatgpt_tts_upload,
        handlers::pipeline::stt_chatgpt_tts_upload_json,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::speech::TextToSpeechRequest,
            handlers::speech::AudioUrlRequest,
            handlers::speech::TranscriptionResponse,
            handlers::chatgpt::ChatRequest,
            handlers::chatgpt::ChatResponse,
            handlers::chatgpt::ChatUploadResponse,
            handlers::assistant::AssistantRequest,
            handlers::assistant::AssistantResponse,
            handlers::pipeline::PipelineJsonResponse,
            handlers::common::AudioUploadForm,
            crate::error::ErrorResponse,
        )
    )
)]
#[derive(Debug)]
pub struct ApiDoc;

/// Routes serving the OpenAPI document and Swagger UI
pub fn create_openapi_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
