//! Speech service - Transcription and synthesis use cases

use std::{fmt, sync::Arc};

use domain::VoiceProvider;
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{AudioUpload, SpeechAudio, SynthesisPort, TranscriptionPort},
};

/// Service for speech-to-text and text-to-speech
pub struct SpeechService {
    transcription: Arc<dyn TranscriptionPort>,
    synthesis: Arc<dyn SynthesisPort>,
}

impl fmt::Debug for SpeechService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechService").finish_non_exhaustive()
    }
}

impl SpeechService {
    pub fn new(
        transcription: Arc<dyn TranscriptionPort>,
        synthesis: Arc<dyn SynthesisPort>,
    ) -> Self {
        Self {
            transcription,
            synthesis,
        }
    }

    /// Transcribe the audio file at `url`
    #[instrument(skip(self))]
    pub async fn transcribe_url(&self, url: &str) -> Result<String, ApplicationError> {
        let text = self.transcription.transcribe_url(url).await?;
        debug!(text_len = text.len(), "Transcribed remote audio");
        Ok(text)
    }

    /// Transcribe an uploaded file
    #[instrument(skip(self, upload), fields(size = upload.data.len(), filename = ?upload.filename))]
    pub async fn transcribe_upload(&self, upload: AudioUpload) -> Result<String, ApplicationError> {
        let text = self.transcription.transcribe_upload(upload).await?;
        debug!(text_len = text.len(), "Transcribed upload");
        Ok(text)
    }

    /// Synthesize `text` to speech
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = ?provider))]
    pub async fn synthesize(
        &self,
        text: &str,
        provider: Option<VoiceProvider>,
    ) -> Result<SpeechAudio, ApplicationError> {
        let audio = self.synthesis.synthesize(text, provider).await?;
        debug!(audio_size = audio.data.len(), "Synthesized speech");
        Ok(audio)
    }
}
