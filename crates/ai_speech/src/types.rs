//! Types for speech processing
//!
//! Contains data structures for audio formats, staged audio files,
//! transcriptions, and buffered synthesis output.

use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Audio formats the gateways know how to label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format
    Mp3,
    /// M4A/AAC format
    M4a,
    /// WAV format (uncompressed)
    Wav,
    /// OGG container
    Ogg,
    /// FLAC format (lossless)
    Flac,
    /// WebM format
    Webm,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::M4a => "audio/m4a",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
            Self::Webm => "audio/webm",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::Webm => "webm",
        }
    }

    /// Parse audio format from a file extension (without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" | "mpga" | "mpeg" => Some(Self::Mp3),
            "m4a" | "mp4" => Some(Self::M4a),
            "wav" => Some(Self::Wav),
            "ogg" | "oga" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    /// Check if the transcription provider needs this format re-encoded
    #[must_use]
    pub const fn needs_transcoding(&self) -> bool {
        matches!(self, Self::M4a)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// An audio file written to a request-scoped staging directory, ready to
/// be submitted to the transcription provider
///
/// The file is owned by the staging directory; dropping that directory
/// removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAudio {
    path: PathBuf,
    extension: String,
}

impl StagedAudio {
    /// Describe a staged file
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Path of the staged file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved file extension (without the dot)
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name to present to the provider
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("audio.{}", self.extension)
    }

    /// MIME type to present to the provider
    #[must_use]
    pub fn mime_type(&self) -> String {
        AudioFormat::from_extension(&self.extension).map_or_else(
            || {
                mime_guess::from_ext(&self.extension)
                    .first_or_octet_stream()
                    .to_string()
            },
            |format| format.mime_type().to_string(),
        )
    }
}

/// Result of speech-to-text transcription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Detected language (ISO 639-1 code)
    pub language: Option<String>,
    /// Duration of the audio in milliseconds
    pub duration_ms: Option<u64>,
}

impl Transcription {
    /// Create a simple transcription with just text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            duration_ms: None,
        }
    }

    /// Set the detected language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the duration
    #[must_use]
    pub const fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Fully buffered synthesis output
///
/// The provider's chunked response is concatenated into one buffer that
/// starts at position 0 and is consumed by a single sequential read.
#[derive(Debug)]
pub struct SynthesizedAudio {
    cursor: Cursor<Bytes>,
    format: AudioFormat,
}

impl SynthesizedAudio {
    /// Wrap a complete audio buffer
    #[must_use]
    pub const fn new(data: Bytes, format: AudioFormat) -> Self {
        Self {
            cursor: Cursor::new(data),
            format,
        }
    }

    /// Concatenate provider chunks in order
    #[must_use]
    pub fn from_chunks<I>(chunks: I, format: AudioFormat) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut buffer = Vec::new();
        for chunk in chunks {
            buffer.extend_from_slice(&chunk);
        }
        Self::new(Bytes::from(buffer), format)
    }

    /// Audio format of the buffer
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// MIME type of the buffer
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Current read position
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Total size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Check if the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Consume and return the remaining bytes from the current position
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        let position = usize::try_from(self.cursor.position()).unwrap_or(usize::MAX);
        let data = self.cursor.into_inner();
        if position >= data.len() {
            Bytes::new()
        } else {
            data.slice(position..)
        }
    }
}

impl Read for SynthesizedAudio {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}
