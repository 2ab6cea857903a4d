//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech provider adapters must implement.

use async_trait::async_trait;
use domain::VoiceProvider;

use crate::error::SpeechError;
use crate::types::{StagedAudio, SynthesizedAudio, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// Implementations submit a staged audio file to a transcription provider.
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechToText, StagedAudio};
///
/// async fn transcribe_file(
///     stt: &impl SpeechToText,
///     audio: &StagedAudio,
/// ) -> Result<String, SpeechError> {
///     let transcription = stt.transcribe(audio).await?;
///     Ok(transcription.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a staged audio file to text
    ///
    /// # Arguments
    ///
    /// * `audio` - Staged file in a provider-accepted format
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the file cannot be read or the provider
    /// rejects it.
    async fn transcribe(&self, audio: &StagedAudio) -> Result<Transcription, SpeechError>;

    /// Get the name of the current STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
///
/// One implementation exists per [`VoiceProvider`]; each one uses fixed
/// voice and model parameters taken from configuration.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// The provider response is read to completion and returned as one
    /// buffer positioned at its start.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError>;

    /// Which provider this implementation talks to
    fn provider(&self) -> VoiceProvider;

    /// Get the name of the current TTS model
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioFormat;
    use bytes::Bytes;

    struct MockStt;

    #[async_trait]
    impl SpeechToText for MockStt {
        async fn transcribe(&self, audio: &StagedAudio) -> Result<Transcription, SpeechError> {
            Ok(Transcription::new(format!("heard {}", audio.extension())))
        }

        fn model_name(&self) -> &str {
            "mock-stt"
        }
    }

    struct MockTts;

    #[async_trait]
    impl TextToSpeech for MockTts {
        async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SpeechError> {
            if text.is_empty() {
                return Err(SpeechError::SynthesisFailed("empty".to_string()));
            }
            Ok(SynthesizedAudio::new(
                Bytes::copy_from_slice(text.as_bytes()),
                AudioFormat::Mp3,
            ))
        }

        fn provider(&self) -> VoiceProvider {
            VoiceProvider::OpenAi
        }

        fn model_name(&self) -> &str {
            "mock-tts"
        }
    }

    #[tokio::test]
    async fn stt_is_object_safe() {
        let stt: Box<dyn SpeechToText> = Box::new(MockStt);
        let staged = StagedAudio::new("/tmp/input.wav", "wav");
        let result = stt.transcribe(&staged).await.unwrap();
        assert_eq!(result.text, "heard wav");
        assert_eq!(stt.model_name(), "mock-stt");
    }

    #[tokio::test]
    async fn tts_is_object_safe() {
        let tts: Box<dyn TextToSpeech> = Box::new(MockTts);
        let audio = tts.synthesize("hi").await.unwrap();
        assert_eq!(audio.into_bytes(), Bytes::from_static(b"hi"));
        assert_eq!(tts.provider(), VoiceProvider::OpenAi);
        assert!(tts.synthesize("").await.is_err());
    }
}
