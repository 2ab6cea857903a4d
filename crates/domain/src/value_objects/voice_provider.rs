//! Voice provider - Selects the speech synthesis backend

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::DomainError;

/// Supported speech synthesis providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoiceProvider {
    /// ElevenLabs text-to-speech API
    #[default]
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    /// OpenAI audio speech API
    #[serde(rename = "openai")]
    OpenAi,
}

impl VoiceProvider {
    /// Get the display name for this provider
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ElevenLabs => "ElevenLabs",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Get the config/wire key for this provider
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ElevenLabs => "elevenlabs",
            Self::OpenAi => "openai",
        }
    }
}

impl fmt::Display for VoiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elevenlabs" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAi),
            _ => Err(DomainError::InvalidVoiceProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_elevenlabs() {
        assert_eq!(VoiceProvider::default(), VoiceProvider::ElevenLabs);
    }

    #[test]
    fn parses_known_values_case_insensitive() {
        assert_eq!(
            "elevenlabs".parse::<VoiceProvider>().unwrap(),
            VoiceProvider::ElevenLabs
        );
        assert_eq!(
            "OpenAI".parse::<VoiceProvider>().unwrap(),
            VoiceProvider::OpenAi
        );
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = "polly".parse::<VoiceProvider>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidVoiceProvider(_)));
    }

    #[test]
    fn display_matches_wire_key() {
        assert_eq!(VoiceProvider::ElevenLabs.to_string(), "elevenlabs");
        assert_eq!(VoiceProvider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn display_name_is_human_readable() {
        assert_eq!(VoiceProvider::OpenAi.display_name(), "OpenAI");
    }

    #[test]
    fn serde_uses_wire_keys() {
        assert_eq!(
            serde_json::to_string(&VoiceProvider::OpenAi).unwrap(),
            "\"openai\""
        );
        assert_eq!(
            serde_json::from_str::<VoiceProvider>("\"elevenlabs\"").unwrap(),
            VoiceProvider::ElevenLabs
        );
        assert!(serde_json::from_str::<VoiceProvider>("\"polly\"").is_err());
    }
}
