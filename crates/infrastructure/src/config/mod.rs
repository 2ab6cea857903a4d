//! Application configuration
//!
//! Loaded once at startup from, in increasing precedence:
//! - built-in defaults
//! - a TOML file (`config.toml`, or the path in `VOICEGATE_CONFIG`)
//! - `VOICEGATE_`-prefixed environment variables with `__` between
//!   sections, e.g. `VOICEGATE_SERVER__PORT=9000`
//! - the plain provider variables such as `OPENAI_API_KEY`
//!
//! The result is immutable; there is no reload.

mod server;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use ai_core::OpenAiConfig;
use ai_speech::SpeechConfig;
use config::ConfigError;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};

pub use server::ServerConfig;

/// Prefix of structured environment overrides
pub const ENV_PREFIX: &str = "VOICEGATE";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "VOICEGATE_CONFIG";

/// Plain provider variables and the config keys they set
const PLAIN_ENV_VARS: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "keys.openai_api_key"),
    ("ELEVENLABS_API_KEY", "keys.elevenlabs_api_key"),
    ("ELEVENLABS_VOICE_ID", "speech.elevenlabs_voice_id"),
    ("ELEVENLABS_MODEL_ID", "speech.elevenlabs_model_id"),
    ("OPENAI_MODEL", "speech.stt_model"),
    ("OPENAI_CHAT_MODEL", "openai.chat_model"),
    ("OPENAI_ASSISTANT_ID", "openai.assistant_id"),
    ("OPENAI_ASSISTANT_MODEL", "openai.assistant_model"),
];

/// Provider credentials
#[derive(Clone, Default, Deserialize)]
pub struct ProviderKeys {
    /// OpenAI key, shared by Whisper, TTS, chat, and assistants
    #[serde(default)]
    pub openai_api_key: Option<SecretString>,

    /// ElevenLabs key
    #[serde(default)]
    pub elevenlabs_api_key: Option<SecretString>,
}

impl fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderKeys")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "elevenlabs_api_key",
                &self.elevenlabs_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech-to-text and text-to-speech configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Chat completion and assistant configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Provider credentials
    #[serde(default)]
    pub keys: ProviderKeys,
}

impl AppConfig {
    /// Load configuration from the process environment and optional file
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let file = vars.get(CONFIG_PATH_VAR).cloned();
        Self::load_from(file.as_deref().map(Path::new), &vars)
    }

    /// Load configuration from `file` (or `config.toml` when present) and
    /// the environment snapshot `vars`
    pub fn load_from(
        file: Option<&Path>,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let file_source = file.map_or_else(
            || config::File::with_name("config").required(false),
            config::File::from,
        );

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            );

        for (var, key) in PLAIN_ENV_VARS {
            let value = vars
                .get(*var)
                .filter(|v| !v.trim().is_empty())
                .cloned();
            builder = builder.set_override_option(*key, value)?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }

    /// Check every section
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.speech.validate()?;
        self.openai.validate()?;
        Ok(())
    }

    /// Speech settings with the configured credentials applied
    #[must_use]
    pub fn speech_config(&self) -> SpeechConfig {
        let mut speech = self.speech.clone();
        if let Some(key) = &self.keys.openai_api_key {
            speech.openai_api_key = Some(key.clone());
        }
        if let Some(key) = &self.keys.elevenlabs_api_key {
            speech.elevenlabs_api_key = Some(key.clone());
        }
        speech
    }

    /// OpenAI settings with the configured credentials applied
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        let mut openai = self.openai.clone();
        if let Some(key) = &self.keys.openai_api_key {
            openai.api_key = Some(key.clone());
        }
        openai
    }

    /// Log the effective settings and any missing credentials
    pub fn log_summary(&self) {
        let has_openai = self.keys.openai_api_key.is_some()
            || self.openai.api_key.is_some()
            || self.speech.openai_api_key.is_some();
        let has_elevenlabs =
            self.keys.elevenlabs_api_key.is_some() || self.speech.elevenlabs_api_key.is_some();

        if !has_openai {
            warn!("No OpenAI API key configured, transcription and chat adapters cannot be built");
        }
        if !has_elevenlabs {
            warn!("No ElevenLabs API key configured, ElevenLabs synthesis is disabled");
        }

        info!(
            bind = %self.server.bind_address(),
            default_voice_provider = %self.speech.default_provider,
            chat_model = %self.openai.chat_model,
            assistant_configured = self.openai.configured_assistant_id().is_some(),
            "Configuration loaded"
        );
    }
}
