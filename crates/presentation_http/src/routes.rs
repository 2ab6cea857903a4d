//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
};
use infrastructure::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware::RequestIdLayer, openapi, state::AppState};

/// Create the router with all routes and middleware
///
/// JSON endpoints and upload endpoints get separate body limits.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let json_routes = Router::new()
        .route("/text-to-speech", post(handlers::speech::text_to_speech))
        .route(
            "/speech-to-text/audio-url",
            post(handlers::speech::speech_to_text_from_url),
        )
        .route("/chatgpt", post(handlers::chatgpt::chatgpt))
        .route("/assistant", post(handlers::assistant::assistant))
        .route("/assistant/audio", post(handlers::assistant::assistant_audio))
        .layer(DefaultBodyLimit::max(config.max_body_size_json_bytes));

    let upload_routes = Router::new()
        .route(
            "/speech-to-text/upload",
            post(handlers::speech::speech_to_text_from_upload),
        )
        .route("/chatgpt/upload", post(handlers::chatgpt::chatgpt_upload))
        .route(
            "/assistant/upload",
            post(handlers::assistant::assistant_upload),
        )
        .route(
            "/assistant/upload/audio",
            post(handlers::assistant::assistant_upload_audio),
        )
        .route(
            "/stt-chatgpt-tts/upload",
            post(handlers::pipeline::stt_chatgpt_tts_upload),
        )
        .route(
            "/stt-chatgpt-tts/upload/json",
            post(handlers::pipeline::stt_chatgpt_tts_upload_json),
        )
        .layer(DefaultBodyLimit::max(config.max_body_size_audio_bytes));

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(json_routes)
        .merge(upload_routes)
        .merge(openapi::create_openapi_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_enabled {
        router = router.layer(cors_layer(&config.allowed_origins));
    }

    // Outermost so every log line carries the request ID
    router.layer(RequestIdLayer::new())
}

/// Any origin when `allowed_origins` is empty, otherwise only those listed
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static("x-thread-id"),
            HeaderName::from_static("x-request-id"),
        ]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any).allow_methods(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    layer
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
