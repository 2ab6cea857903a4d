//! ElevenLabs Speech Provider
//!
//! Implements `TextToSpeech` against the ElevenLabs REST API
//! (`POST /v1/text-to-speech/{voice_id}`).

use std::time::Duration;

use async_trait::async_trait;
use domain::VoiceProvider;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::collect_chunks;
use crate::config::{SpeechConfig, VoiceSettings};
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::{AudioFormat, SynthesizedAudio};

/// ElevenLabs text-to-speech provider
#[derive(Debug, Clone)]
pub struct ElevenLabsSpeechProvider {
    client: Client,
    config: SpeechConfig,
    api_key: SecretString,
}

impl ElevenLabsSpeechProvider {
    /// Create a new ElevenLabs provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid
    /// or no ElevenLabs API key is set.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        let api_key = config
            .require_elevenlabs_key()
            .map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn tts_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.elevenlabs_base_url.trim_end_matches('/'),
            self.config.elevenlabs_voice_id
        )
    }

    /// Audio format implied by an output format such as `mp3_22050_32`
    fn output_audio_format(output_format: &str) -> AudioFormat {
        output_format
            .split('_')
            .next()
            .and_then(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Mp3)
    }

    /// Pull a human-readable message out of an ElevenLabs error body
    ///
    /// Errors arrive either as `{"detail": {"message": ...}}` or
    /// `{"detail": "..."}`.
    fn error_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

/// ElevenLabs synthesis request body
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[async_trait]
impl TextToSpeech for ElevenLabsSpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice_id = %self.config.elevenlabs_voice_id))]
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError> {
        debug!("Synthesizing speech with ElevenLabs");

        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let request = SynthesisRequest {
            text,
            model_id: &self.config.elevenlabs_model_id,
            voice_settings: &self.config.voice_settings,
        };

        let response = self
            .client
            .post(self.tts_url())
            .query(&[("output_format", self.config.elevenlabs_output_format.as_str())])
            .header("xi-api-key", self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = Self::error_message(&error_body)
                .unwrap_or_else(|| format!("HTTP {status}: {error_body}"));

            return Err(match status {
                reqwest::StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited,
                reqwest::StatusCode::NOT_FOUND => {
                    SpeechError::VoiceNotFound(self.config.elevenlabs_voice_id.clone())
                },
                _ => SpeechError::SynthesisFailed(message),
            });
        }

        let format = Self::output_audio_format(&self.config.elevenlabs_output_format);
        let audio = collect_chunks(response.bytes_stream(), format).await?;
        debug!(audio_size = audio.len(), "Speech synthesis complete");
        Ok(audio)
    }

    fn provider(&self) -> VoiceProvider {
        VoiceProvider::ElevenLabs
    }

    fn model_name(&self) -> &str {
        &self.config.elevenlabs_model_id
    }
}
