//! FFmpeg transcoding for staged uploads
//!
//! M4A is the only container the transcription provider rejects in practice,
//! so the converter knows a single job: re-encode a staged file to MP3 next
//! to the original. It works on files rather than pipes because MP4 keeps
//! its index at the end of the stream.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::error::SpeechError;
use crate::types::AudioFormat;

const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Runs FFmpeg against files in a staging directory
#[derive(Debug, Clone, Default)]
pub struct AudioConverter {
    ffmpeg_path: Option<String>,
}

impl AudioConverter {
    /// Converter using `ffmpeg` from `PATH`
    #[must_use]
    pub const fn new() -> Self {
        Self { ffmpeg_path: None }
    }

    /// Converter using an explicit FFmpeg binary
    #[must_use]
    pub fn with_ffmpeg_path(path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: Some(path.into()),
        }
    }

    fn binary(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or(DEFAULT_FFMPEG)
    }

    /// Re-encode `input` as `<stem>.mp3` in the same directory
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::AudioFormat`] if FFmpeg cannot be spawned,
    /// exits unsuccessfully, or leaves an empty file behind. The input is
    /// never handed back in place of a failed conversion.
    #[instrument(skip(self), fields(input = %input.display()))]
    pub async fn to_mp3(&self, input: &Path) -> Result<PathBuf, SpeechError> {
        let output = input.with_extension(AudioFormat::Mp3.extension());
        if output == input {
            debug!("Input is already mp3");
            return Ok(output);
        }

        let result = Command::new(self.binary())
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "2"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::AudioFormat(format!("Could not run {}: {e}", self.binary())))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!(status = %result.status, "Transcode to mp3 failed");
            return Err(SpeechError::AudioFormat(format!(
                "Transcode to mp3 failed: {}",
                stderr.trim()
            )));
        }

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => {
                debug!(output_size = meta.len(), "Transcoded to mp3");
                Ok(output)
            },
            _ => Err(SpeechError::AudioFormat(
                "Transcode to mp3 produced no audio".to_string(),
            )),
        }
    }
}
