//! Configuration for the OpenAI completion and assistant gateways

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for the OpenAI chat and Assistants APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (`Authorization: Bearer ...`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL of the OpenAI API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used by the completion gateway
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// System instruction sent ahead of every completion
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Pre-created assistant; when unset one is created on first use
    #[serde(default)]
    pub assistant_id: Option<String>,

    /// Name of a lazily created assistant
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Instructions of a lazily created assistant
    #[serde(default = "default_assistant_instructions")]
    pub assistant_instructions: String,

    /// Model of a lazily created assistant
    #[serde(default = "default_assistant_model")]
    pub assistant_model: String,

    /// Delay between run status reads in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on a single run in seconds
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Per-request HTTP timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant.".to_string()
}

fn default_assistant_name() -> String {
    "Voice Assistant".to_string()
}

fn default_assistant_instructions() -> String {
    "You are a helpful AI assistant. Answer kindly and accurately.".to_string()
}

fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_run_timeout_secs() -> u64 {
    60
}

const fn default_timeout_ms() -> u64 {
    30000
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            system_prompt: default_system_prompt(),
            assistant_id: None,
            assistant_name: default_assistant_name(),
            assistant_instructions: default_assistant_instructions(),
            assistant_model: default_assistant_model(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl OpenAiConfig {
    /// Check the settings for values the gateways cannot work with
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("OpenAI base URL cannot be empty".to_string());
        }
        if self.chat_model.trim().is_empty() {
            return Err("Chat model cannot be empty".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be greater than zero".to_string());
        }
        if self.run_timeout_secs == 0 {
            return Err("Run timeout must be greater than zero".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than zero".to_string());
        }
        Ok(())
    }

    /// API key, or an error naming the missing setting
    pub(crate) fn require_api_key(&self) -> Result<SecretString, String> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .cloned()
            .ok_or_else(|| "OpenAI API key is not configured".to_string())
    }

    /// Configured assistant id, ignoring blank values
    #[must_use]
    pub fn configured_assistant_id(&self) -> Option<&str> {
        self.assistant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
