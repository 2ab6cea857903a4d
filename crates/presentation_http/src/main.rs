//! Voicegate HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use application::{AssistantService, ChatService, SpeechService};
use infrastructure::{
    AppConfig, CompletionAdapter, ConversationAdapter, SynthesisAdapter, TranscriptionAdapter,
};
use presentation_http::{AppState, create_router, error::set_expose_internal_errors};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(config.server.json_logs());

    info!("Voicegate v{} starting...", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    set_expose_internal_errors(config.server.expose_internal_errors);

    let state = build_state(&config)?;
    let app = create_router(state, &config.server);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);
    info!("API docs: http://{}/swagger-ui", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// Install the global subscriber; `RUST_LOG` overrides the default filter
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Build the adapters and services from the loaded configuration
fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let speech_config = config.speech_config();
    let openai_config = config.openai_config();

    let transcription = TranscriptionAdapter::from_config(&speech_config)
        .context("Failed to initialize transcription")?;
    let synthesis =
        SynthesisAdapter::from_config(&speech_config).context("Failed to initialize synthesis")?;
    let completion = CompletionAdapter::from_config(&openai_config)
        .context("Failed to initialize chat completion")?;
    let conversation = ConversationAdapter::from_config(&openai_config)
        .context("Failed to initialize assistant conversations")?;

    Ok(AppState::new(
        Arc::new(SpeechService::new(
            Arc::new(transcription),
            Arc::new(synthesis),
        )),
        Arc::new(ChatService::new(Arc::new(completion))),
        Arc::new(AssistantService::new(Arc::new(conversation))),
    ))
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("Waiting up to {:?} for connections to close...", timeout);
}
