//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech` traits.

pub mod elevenlabs;
pub mod openai;

pub use elevenlabs::ElevenLabsSpeechProvider;
pub use openai::OpenAISpeechProvider;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::SpeechError;
use crate::types::{AudioFormat, SynthesizedAudio};

/// Drain a chunked provider body into one buffer
///
/// Empty chunks are skipped. A body that yields no bytes at all is a
/// synthesis failure.
pub(crate) async fn collect_chunks<S, E>(
    stream: S,
    format: AudioFormat,
) -> Result<SynthesizedAudio, SpeechError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
    }

    let audio = SynthesizedAudio::from_chunks(chunks, format);
    if audio.is_empty() {
        return Err(SpeechError::SynthesisFailed(
            "Provider returned empty audio".to_string(),
        ));
    }
    Ok(audio)
}
