//! Transcription gateway
//!
//! Accepts a remote audio URL or an uploaded buffer, stages it in a
//! request-scoped directory, normalizes it, and submits it to the
//! transcription provider. The staging directory is removed on every exit
//! path when its guard drops.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::config::SpeechConfig;
use crate::converter::AudioConverter;
use crate::error::SpeechError;
use crate::normalizer::{AudioHints, AudioNormalizer};
use crate::ports::SpeechToText;

/// Prefix for request-scoped staging directories
const STAGING_PREFIX: &str = "voicegate-stt-";

/// Speech-to-text entry point used by the application layer
#[derive(Clone)]
pub struct TranscriptionGateway {
    stt: Arc<dyn SpeechToText>,
    normalizer: AudioNormalizer,
    client: Client,
    temp_root: Option<PathBuf>,
}

impl std::fmt::Debug for TranscriptionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionGateway")
            .field("model", &self.stt.model_name())
            .field("temp_root", &self.temp_root)
            .finish_non_exhaustive()
    }
}

impl TranscriptionGateway {
    /// Create a gateway around an STT provider using the speech config for
    /// the FFmpeg path, staging root, and fetch timeout
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(stt: Arc<dyn SpeechToText>, config: &SpeechConfig) -> Result<Self, SpeechError> {
        let converter = config
            .ffmpeg_path
            .as_ref()
            .map_or_else(AudioConverter::new, AudioConverter::with_ffmpeg_path);

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(model = %stt.model_name(), temp_root = ?config.temp_dir, "Initialized transcription gateway");

        Ok(Self {
            stt,
            normalizer: AudioNormalizer::new(converter),
            client,
            temp_root: config.temp_dir.clone(),
        })
    }

    /// Replace the staging root directory
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Download audio from `url` and transcribe it
    ///
    /// # Errors
    ///
    /// - [`SpeechError::Fetch`] on network failure or a non-2xx response
    /// - [`SpeechError::AudioFormat`] if the payload is empty or cannot be transcoded
    /// - provider errors from the transcription call
    #[instrument(skip(self), fields(model = %self.stt.model_name()))]
    pub async fn transcribe_from_url(&self, url: &str) -> Result<String, SpeechError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SpeechError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Fetch(format!("HTTP {status} from {url}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Fetch(format!("Failed to read body: {e}")))?;

        debug!(size = data.len(), content_type = ?content_type, "Fetched remote audio");

        self.transcribe_staged(&data, AudioHints::new(Some(url), content_type.as_deref()))
            .await
    }

    /// Transcribe an uploaded buffer
    ///
    /// # Errors
    ///
    /// - [`SpeechError::AudioFormat`] if the payload is empty or cannot be transcoded
    /// - provider errors from the transcription call
    #[instrument(skip(self, data), fields(size = data.len(), model = %self.stt.model_name()))]
    pub async fn transcribe_from_upload(
        &self,
        data: &[u8],
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<String, SpeechError> {
        self.transcribe_staged(data, AudioHints::new(filename, content_type))
            .await
    }

    async fn transcribe_staged(
        &self,
        data: &[u8],
        hints: AudioHints<'_>,
    ) -> Result<String, SpeechError> {
        let staging = self.staging_dir()?;

        let staged = self.normalizer.stage(data, hints, staging.path()).await?;
        let transcription = self.stt.transcribe(&staged).await?;

        if let Err(e) = staging.close() {
            warn!(error = %e, "Failed to remove staging directory");
        }

        debug!(text_len = transcription.text.len(), "Transcription complete");
        Ok(transcription.text)
    }

    fn staging_dir(&self) -> Result<TempDir, SpeechError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);

        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };

        dir.map_err(|e| SpeechError::Staging(format!("Failed to create staging directory: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StagedAudio, Transcription};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every staged file it is handed
    #[derive(Default)]
    struct RecordingStt {
        extensions: Mutex<Vec<String>>,
        paths: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    #[async_trait]
    impl SpeechToText for RecordingStt {
        async fn transcribe(&self, audio: &StagedAudio) -> Result<Transcription, SpeechError> {
            self.extensions.lock().push(audio.extension().to_string());
            self.paths.lock().push(audio.path().to_path_buf());
            assert!(audio.path().exists(), "staged file must exist during the call");
            if self.fail {
                return Err(SpeechError::TranscriptionFailed("rejected".to_string()));
            }
            Ok(Transcription::new("hello there"))
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn gateway(stt: Arc<RecordingStt>, root: &std::path::Path) -> TranscriptionGateway {
        let config = SpeechConfig {
            ffmpeg_path: Some("/nonexistent/ffmpeg".to_string()),
            ..SpeechConfig::default()
        };
        TranscriptionGateway::new(stt, &config)
            .unwrap()
            .with_temp_root(root)
    }

    fn entries(root: &std::path::Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[tokio::test]
    async fn upload_success_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let stt = Arc::new(RecordingStt::default());
        let gateway = gateway(Arc::clone(&stt), root.path());

        let text = gateway
            .transcribe_from_upload(b"ID3data", Some("clip.mp3"), Some("audio/mpeg"))
            .await
            .unwrap();

        assert_eq!(text, "hello there");
        assert_eq!(stt.extensions.lock().as_slice(), ["mp3"]);
        assert!(!stt.paths.lock()[0].exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn upload_provider_failure_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let stt = Arc::new(RecordingStt {
            fail: true,
            ..RecordingStt::default()
        });
        let gateway = gateway(Arc::clone(&stt), root.path());

        let result = gateway
            .transcribe_from_upload(b"RIFF", None, Some("audio/wav"))
            .await;

        assert!(matches!(result, Err(SpeechError::TranscriptionFailed(_))));
        assert_eq!(stt.extensions.lock().as_slice(), ["wav"]);
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn upload_transcode_failure_cleans_up_and_skips_provider() {
        let root = tempfile::tempdir().unwrap();
        let stt = Arc::new(RecordingStt::default());
        let gateway = gateway(Arc::clone(&stt), root.path());

        let result = gateway
            .transcribe_from_upload(b"ftypM4A", Some("memo.m4a"), Some("audio/mp4"))
            .await;

        assert!(matches!(result, Err(SpeechError::AudioFormat(_))));
        assert!(stt.extensions.lock().is_empty());
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn empty_upload_is_audio_format_error() {
        let root = tempfile::tempdir().unwrap();
        let stt = Arc::new(RecordingStt::default());
        let gateway = gateway(Arc::clone(&stt), root.path());

        let result = gateway.transcribe_from_upload(b"", None, None).await;

        assert!(matches!(result, Err(SpeechError::AudioFormat(_))));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn missing_temp_root_is_staging_error() {
        let stt = Arc::new(RecordingStt::default());
        let gateway = gateway(stt, std::path::Path::new("/nonexistent/voicegate/root"));

        let result = gateway.transcribe_from_upload(b"abc", None, None).await;

        assert!(matches!(result, Err(SpeechError::Staging(_))));
    }
}
