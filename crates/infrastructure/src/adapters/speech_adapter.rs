//! Speech adapters - Implement the speech ports using the ai_speech gateways

use std::io::Read;
use std::sync::Arc;

use ai_speech::{
    OpenAISpeechProvider, SpeechConfig, SpeechError, SynthesisGateway, TranscriptionGateway,
};
use application::error::ApplicationError;
use application::ports::{AudioUpload, SpeechAudio, SynthesisPort, TranscriptionPort};
use async_trait::async_trait;
use domain::VoiceProvider;
use tracing::instrument;

/// Map speech error to application error
fn map_error(err: SpeechError) -> ApplicationError {
    match err {
        SpeechError::Configuration(e) => ApplicationError::Configuration(e),
        SpeechError::Fetch(_) | SpeechError::ConnectionFailed(_) | SpeechError::Timeout(_) => {
            ApplicationError::ExternalService(err.to_string())
        },
        SpeechError::RateLimited => ApplicationError::RateLimited,
        SpeechError::Staging(e) => ApplicationError::Internal(e),
        other => ApplicationError::Speech(other.to_string()),
    }
}

/// Adapter binding [`TranscriptionPort`] to the transcription gateway
#[derive(Debug, Clone)]
pub struct TranscriptionAdapter {
    gateway: TranscriptionGateway,
}

impl TranscriptionAdapter {
    pub const fn new(gateway: TranscriptionGateway) -> Self {
        Self { gateway }
    }

    /// Build the gateway around the OpenAI Whisper provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider cannot be created.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, ApplicationError> {
        let whisper = OpenAISpeechProvider::new(config.clone()).map_err(map_error)?;
        let gateway = TranscriptionGateway::new(Arc::new(whisper), config).map_err(map_error)?;
        Ok(Self::new(gateway))
    }
}

#[async_trait]
impl TranscriptionPort for TranscriptionAdapter {
    #[instrument(skip(self))]
    async fn transcribe_url(&self, url: &str) -> Result<String, ApplicationError> {
        self.gateway.transcribe_from_url(url).await.map_err(map_error)
    }

    #[instrument(skip(self, upload), fields(size = upload.data.len()))]
    async fn transcribe_upload(&self, upload: AudioUpload) -> Result<String, ApplicationError> {
        self.gateway
            .transcribe_from_upload(
                &upload.data,
                upload.filename.as_deref(),
                upload.content_type.as_deref(),
            )
            .await
            .map_err(map_error)
    }
}

/// Adapter binding [`SynthesisPort`] to the synthesis gateway
#[derive(Debug, Clone)]
pub struct SynthesisAdapter {
    gateway: SynthesisGateway,
}

impl SynthesisAdapter {
    pub const fn new(gateway: SynthesisGateway) -> Self {
        Self { gateway }
    }

    /// Build the gateway with every provider that has credentials
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, ApplicationError> {
        SynthesisGateway::from_config(config)
            .map(Self::new)
            .map_err(map_error)
    }
}

#[async_trait]
impl SynthesisPort for SynthesisAdapter {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        provider: Option<VoiceProvider>,
    ) -> Result<SpeechAudio, ApplicationError> {
        let mut audio = self
            .gateway
            .synthesize(text, provider)
            .await
            .map_err(map_error)?;

        let content_type = audio.mime_type().to_string();
        let mut data = Vec::with_capacity(audio.len());
        audio
            .read_to_end(&mut data)
            .map_err(|e| ApplicationError::Internal(format!("Failed to read audio buffer: {e}")))?;

        Ok(SpeechAudio { data, content_type })
    }
}
