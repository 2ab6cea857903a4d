//! Speech ports - Interfaces for speech-to-text and text-to-speech operations

use async_trait::async_trait;
use domain::VoiceProvider;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// An uploaded audio file with the metadata the caller declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub data: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl AudioUpload {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            filename: None,
            content_type: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the declared content type is an `audio/*` type
    pub fn is_audio(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("audio/"))
    }
}

/// Fully buffered synthesized speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// Audio bytes, starting at the first frame
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub content_type: String,
}

/// Port for speech-to-text
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Download the audio at `url` and transcribe it
    async fn transcribe_url(&self, url: &str) -> Result<String, ApplicationError>;

    /// Transcribe an uploaded file
    async fn transcribe_upload(&self, upload: AudioUpload) -> Result<String, ApplicationError>;
}

/// Port for text-to-speech
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Synthesize `text` with `provider`, or the configured default when `None`
    async fn synthesize(
        &self,
        text: &str,
        provider: Option<VoiceProvider>,
    ) -> Result<SpeechAudio, ApplicationError>;
}
