//! Speech synthesis gateway
//!
//! Dispatches synthesis requests to the provider selected by a
//! [`VoiceProvider`] value. Each provider is registered once behind the
//! [`TextToSpeech`] capability.

use std::collections::HashMap;
use std::sync::Arc;

use domain::VoiceProvider;
use tracing::{info, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::providers::{ElevenLabsSpeechProvider, OpenAISpeechProvider};
use crate::types::SynthesizedAudio;

/// Text-to-speech entry point used by the application layer
#[derive(Clone)]
pub struct SynthesisGateway {
    providers: HashMap<VoiceProvider, Arc<dyn TextToSpeech>>,
    default_provider: VoiceProvider,
}

impl std::fmt::Debug for SynthesisGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisGateway")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("default_provider", &self.default_provider)
            .finish()
    }
}

impl SynthesisGateway {
    /// Create an empty gateway
    #[must_use]
    pub fn new(default_provider: VoiceProvider) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider,
        }
    }

    /// Register a provider implementation, replacing any previous one for
    /// the same [`VoiceProvider`]
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TextToSpeech>) -> Self {
        self.providers.insert(provider.provider(), provider);
        self
    }

    /// Build a gateway with every provider whose credentials are configured
    ///
    /// Providers without an API key are skipped with a warning; requests
    /// that select them fail with a configuration error.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the shared settings are invalid.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let mut gateway = Self::new(config.default_provider);

        if config.elevenlabs_api_key.is_some() {
            let provider = ElevenLabsSpeechProvider::new(config.clone())?;
            gateway = gateway.with_provider(Arc::new(provider));
        } else {
            warn!("ElevenLabs API key not set, ElevenLabs synthesis disabled");
        }

        if config.openai_api_key.is_some() {
            let provider = OpenAISpeechProvider::new(config.clone())?;
            gateway = gateway.with_provider(Arc::new(provider));
        } else {
            warn!("OpenAI API key not set, OpenAI synthesis disabled");
        }

        info!(
            default_provider = %gateway.default_provider,
            providers = gateway.providers.len(),
            "Initialized synthesis gateway"
        );

        Ok(gateway)
    }

    /// Provider used when a request does not select one
    #[must_use]
    pub const fn default_provider(&self) -> VoiceProvider {
        self.default_provider
    }

    /// Check whether a provider is registered
    #[must_use]
    pub fn supports(&self, provider: VoiceProvider) -> bool {
        self.providers.contains_key(&provider)
    }

    /// Synthesize `text` with the selected provider (or the default)
    ///
    /// # Errors
    ///
    /// - [`SpeechError::Configuration`] if the provider is not registered
    /// - provider errors from the synthesis call
    #[instrument(skip(self, text), fields(text_len = text.len(), provider = tracing::field::Empty))]
    pub async fn synthesize(
        &self,
        text: &str,
        provider: Option<VoiceProvider>,
    ) -> Result<SynthesizedAudio, SpeechError> {
        let selected = provider.unwrap_or(self.default_provider);
        tracing::Span::current().record("provider", selected.as_str());

        let backend = self.providers.get(&selected).ok_or_else(|| {
            SpeechError::Configuration(format!(
                "{} synthesis is not configured",
                selected.display_name()
            ))
        })?;

        backend.synthesize(text).await
    }
}
