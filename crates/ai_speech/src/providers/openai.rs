//! OpenAI Speech Provider
//!
//! Implements `SpeechToText` using OpenAI Whisper and `TextToSpeech` using OpenAI TTS.
//!
//! # Supported Audio Formats
//!
//! ## STT (Whisper)
//! - mp3, mp4, mpeg, mpga, wav, webm
//! - Note: M4A is accepted on paper but fails often enough that the
//!   normalizer re-encodes it to MP3 first
//!
//! ## TTS
//! - Always requested as mp3

use std::time::Duration;

use async_trait::async_trait;
use domain::VoiceProvider;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::collect_chunks;
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};
use crate::types::{AudioFormat, StagedAudio, SynthesizedAudio, Transcription};

/// OpenAI TTS input limit in characters
const MAX_TTS_INPUT_CHARS: usize = 4096;

/// OpenAI speech provider implementing both STT and TTS
#[derive(Debug, Clone)]
pub struct OpenAISpeechProvider {
    client: Client,
    config: SpeechConfig,
    api_key: SecretString,
}

impl OpenAISpeechProvider {
    /// Create a new OpenAI speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid
    /// or no OpenAI API key is set.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        let api_key = config
            .require_openai_key()
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

    /// Build the STT endpoint URL
    fn stt_url(&self) -> String {
        format!("{}/audio/transcriptions", self.config.openai_base_url)
    }

    /// Build the TTS endpoint URL
    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.config.openai_base_url)
    }

    /// Map a non-success response body to a `SpeechError`
    fn map_api_error(
        status: reqwest::StatusCode,
        body: &str,
        model: &str,
        fallback: fn(String) -> SpeechError,
    ) -> SpeechError {
        if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
            return match api_error.error.code.as_deref() {
                Some("rate_limit_exceeded") => SpeechError::RateLimited,
                Some("model_not_found") => SpeechError::ModelNotAvailable(model.to_string()),
                _ => fallback(api_error.error.message),
            };
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return SpeechError::RateLimited;
        }

        fallback(format!("HTTP {status}: {body}"))
    }
}

/// OpenAI Whisper transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

#[async_trait]
impl SpeechToText for OpenAISpeechProvider {
    #[instrument(skip(self, audio), fields(extension = %audio.extension()))]
    async fn transcribe(&self, audio: &StagedAudio) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with OpenAI Whisper");

        let data = tokio::fs::read(audio.path())
            .await
            .map_err(|e| SpeechError::AudioFormat(format!("Failed to read staged audio: {e}")))?;

        if data.is_empty() {
            return Err(SpeechError::AudioFormat("Audio data is empty".to_string()));
        }

        let file_part = Part::bytes(data)
            .file_name(audio.file_name())
            .mime_str(&audio.mime_type())
            .map_err(|e| SpeechError::AudioFormat(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone());

        let response = self
            .client
            .post(self.stt_url())
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::map_api_error(
                status,
                &error_body,
                &self.config.stt_model,
                SpeechError::TranscriptionFailed,
            ));
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            text_len = whisper_response.text.len(),
            language = ?whisper_response.language,
            "Transcription complete"
        );

        let mut transcription = Transcription::new(whisper_response.text);

        if let Some(lang) = whisper_response.language {
            transcription = transcription.with_language(lang);
        }

        if let Some(duration) = whisper_response.duration {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    fn model_name(&self) -> &str {
        &self.config.stt_model
    }
}

#[async_trait]
impl TextToSpeech for OpenAISpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = %self.config.openai_voice))]
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");

        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        if text.chars().count() > MAX_TTS_INPUT_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {} characters exceeds {MAX_TTS_INPUT_CHARS} limit",
                text.chars().count()
            )));
        }

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice: &self.config.openai_voice,
            response_format: AudioFormat::Mp3.extension(),
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if error_body.contains("invalid_voice") {
                return Err(SpeechError::VoiceNotFound(self.config.openai_voice.clone()));
            }
            return Err(Self::map_api_error(
                status,
                &error_body,
                &self.config.tts_model,
                SpeechError::SynthesisFailed,
            ));
        }

        let audio = collect_chunks(response.bytes_stream(), AudioFormat::Mp3).await?;
        debug!(audio_size = audio.len(), "Speech synthesis complete");
        Ok(audio)
    }

    fn provider(&self) -> VoiceProvider {
        VoiceProvider::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.config.tts_model
    }
}
