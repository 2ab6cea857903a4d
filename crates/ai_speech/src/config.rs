//! Configuration for speech processing

use std::path::PathBuf;

use domain::VoiceProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the transcription and synthesis gateways
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Provider used when a request does not select one
    #[serde(default)]
    pub default_provider: VoiceProvider,

    /// OpenAI API key (Whisper transcription and OpenAI TTS)
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<SecretString>,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// OpenAI text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// OpenAI TTS voice name
    #[serde(default = "default_voice")]
    pub openai_voice: String,

    /// OpenAI TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// ElevenLabs API key
    #[serde(default, skip_serializing)]
    pub elevenlabs_api_key: Option<SecretString>,

    /// ElevenLabs API base URL
    #[serde(default = "default_elevenlabs_base_url")]
    pub elevenlabs_base_url: String,

    /// ElevenLabs voice identifier
    #[serde(default = "default_elevenlabs_voice_id")]
    pub elevenlabs_voice_id: String,

    /// ElevenLabs model identifier
    #[serde(default = "default_elevenlabs_model_id")]
    pub elevenlabs_model_id: String,

    /// ElevenLabs output format (codec_samplerate_bitrate)
    #[serde(default = "default_elevenlabs_output_format")]
    pub elevenlabs_output_format: String,

    /// ElevenLabs voice tuning
    #[serde(default)]
    pub voice_settings: VoiceSettings,

    /// FFmpeg binary path (defaults to "ffmpeg" in PATH)
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// Root for request-scoped staging directories (defaults to the system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// ElevenLabs voice settings sent with every synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Lower values give a more expressive, less stable delivery
    #[serde(default)]
    pub stability: f32,
    /// How closely to match the original voice
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
    /// Style exaggeration
    #[serde(default)]
    pub style: f32,
    /// Boost similarity to the original speaker
    #[serde(default = "default_true")]
    pub use_speaker_boost: bool,
    /// Speaking speed
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.0,
            similarity_boost: default_similarity_boost(),
            style: 0.0,
            use_speaker_boost: true,
            speed: default_speed(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_elevenlabs_voice_id() -> String {
    // "Adam" pre-made voice
    "uyVNoMrnUku1dZyVEXwD".to_string()
}

fn default_elevenlabs_model_id() -> String {
    "eleven_flash_v2_5".to_string()
}

fn default_elevenlabs_output_format() -> String {
    "mp3_22050_32".to_string()
}

const fn default_similarity_boost() -> f32 {
    1.0
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_speed() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            default_provider: VoiceProvider::default(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            openai_voice: default_voice(),
            speed: default_speed(),
            elevenlabs_api_key: None,
            elevenlabs_base_url: default_elevenlabs_base_url(),
            elevenlabs_voice_id: default_elevenlabs_voice_id(),
            elevenlabs_model_id: default_elevenlabs_model_id(),
            elevenlabs_output_format: default_elevenlabs_output_format(),
            voice_settings: VoiceSettings::default(),
            ffmpeg_path: None,
            temp_dir: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            openai_api_key: Some("test-key".into()),
            elevenlabs_api_key: Some("test-xi-key".into()),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// Keys are checked per provider by the provider constructors, so a
    /// deployment may run with only one synthesis provider configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.elevenlabs_voice_id.trim().is_empty() {
            return Err("ElevenLabs voice id must not be empty".to_string());
        }

        Ok(())
    }

    /// OpenAI key, or a configuration error naming the missing setting
    pub(crate) fn require_openai_key(&self) -> Result<SecretString, String> {
        present_key(self.openai_api_key.as_ref())
            .ok_or_else(|| "OpenAI API key is required".to_string())
    }

    /// ElevenLabs key, or a configuration error naming the missing setting
    pub(crate) fn require_elevenlabs_key(&self) -> Result<SecretString, String> {
        present_key(self.elevenlabs_api_key.as_ref())
            .ok_or_else(|| "ElevenLabs API key is required".to_string())
    }
}

fn present_key(key: Option<&SecretString>) -> Option<SecretString> {
    key.filter(|k| !k.expose_secret().trim().is_empty()).cloned()
}
