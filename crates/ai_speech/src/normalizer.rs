//! Audio normalization ahead of transcription
//!
//! Picks a file extension for an incoming payload from its name and declared
//! content type, stages it on disk, and re-encodes formats the transcription
//! provider does not reliably accept.

use std::path::Path;

use tracing::{debug, instrument};

use crate::converter::AudioConverter;
use crate::error::SpeechError;
use crate::types::{AudioFormat, StagedAudio};

/// Extension used when no hint is usable
pub const FALLBACK_EXTENSION: &str = "mp3";

/// Hints that accompany an audio payload
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioHints<'a> {
    /// Upload file name or source URL
    pub name: Option<&'a str>,
    /// Declared MIME type
    pub content_type: Option<&'a str>,
}

impl<'a> AudioHints<'a> {
    /// Build hints from an optional name and content type
    #[must_use]
    pub const fn new(name: Option<&'a str>, content_type: Option<&'a str>) -> Self {
        Self { name, content_type }
    }
}

/// Resolve the file extension (without the dot) for an audio payload
///
/// Priority: the name or URL path suffix, the known MIME table, a generic
/// MIME lookup, and finally [`FALLBACK_EXTENSION`]. The result is never empty.
#[must_use]
pub fn resolve_extension(name_or_url: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(ext) = name_or_url.and_then(path_suffix) {
        return ext;
    }

    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());

    if let Some(mime) = mime {
        if let Some(ext) = known_mime_extension(&mime) {
            return ext.to_string();
        }
        if let Some(ext) = mime_guess::get_mime_extensions_str(&mime).and_then(|exts| exts.first())
        {
            return (*ext).to_string();
        }
    }

    FALLBACK_EXTENSION.to_string()
}

fn known_mime_extension(mime: &str) -> Option<&'static str> {
    match mime {
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        _ => None,
    }
}

/// Extract a lower-cased extension from a file name or URL path
fn path_suffix(name_or_url: &str) -> Option<String> {
    let without_fragment = name_or_url.split('#').next().unwrap_or(name_or_url);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);

    // Only the path of a URL carries a file name; skip scheme and host
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => without_query,
    };

    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    valid_extension(ext)
}

fn valid_extension(ext: &str) -> Option<String> {
    (!ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| ext.to_ascii_lowercase())
}

/// Stages audio payloads on disk in a transcription-ready format
#[derive(Debug, Clone, Default)]
pub struct AudioNormalizer {
    converter: AudioConverter,
}

impl AudioNormalizer {
    /// Create a normalizer using the given converter
    #[must_use]
    pub const fn new(converter: AudioConverter) -> Self {
        Self { converter }
    }

    /// Write `data` into `dir` and transcode it if needed
    ///
    /// The caller owns `dir` and is responsible for removing it. Both the
    /// original and any converted file are created inside it.
    ///
    /// # Errors
    ///
    /// - [`SpeechError::AudioFormat`] if the payload is empty or transcoding fails
    /// - [`SpeechError::Staging`] if the file cannot be written
    #[instrument(skip(self, data, dir), fields(size = data.len(), name = ?hints.name, content_type = ?hints.content_type))]
    pub async fn stage(
        &self,
        data: &[u8],
        hints: AudioHints<'_>,
        dir: &Path,
    ) -> Result<StagedAudio, SpeechError> {
        if data.is_empty() {
            return Err(SpeechError::AudioFormat("Audio data is empty".to_string()));
        }

        let extension = resolve_extension(hints.name, hints.content_type);
        let input = dir.join(format!("input.{extension}"));

        tokio::fs::write(&input, data)
            .await
            .map_err(|e| SpeechError::Staging(format!("Failed to write audio file: {e}")))?;

        debug!(extension = %extension, "Staged audio payload");

        match AudioFormat::from_extension(&extension) {
            Some(format) if format.needs_transcoding() => {
                let output = self.converter.to_mp3(&input).await?;
                Ok(StagedAudio::new(output, AudioFormat::Mp3.extension()))
            },
            _ => Ok(StagedAudio::new(input, extension)),
        }
    }
}
