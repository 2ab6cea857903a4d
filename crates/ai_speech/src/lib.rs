//! AI Speech - Audio normalization, transcription and synthesis
//!
//! Provides the speech-facing gateways of the service:
//! - `TranscriptionGateway` - Stage, normalize and transcribe audio (STT)
//! - `SynthesisGateway` - Synthesize speech with a selected provider (TTS)
//! - `AudioNormalizer` - Resolve file extensions and transcode M4A to MP3
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT) and TTS API
//! - ElevenLabs TTS API
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ai_speech::{OpenAISpeechProvider, SpeechConfig, SynthesisGateway, TranscriptionGateway};
//!
//! let config = SpeechConfig::default();
//! let whisper = Arc::new(OpenAISpeechProvider::new(config.clone())?);
//! let stt = TranscriptionGateway::new(whisper, &config)?;
//! let text = stt.transcribe_from_url("https://example.com/memo.m4a").await?;
//!
//! let tts = SynthesisGateway::from_config(&config)?;
//! let audio = tts.synthesize(&text, None).await?;
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod normalizer;
pub mod ports;
pub mod providers;
pub mod synthesis;
pub mod transcription;
pub mod types;

pub use config::{SpeechConfig, VoiceSettings};
pub use converter::AudioConverter;
pub use error::SpeechError;
pub use normalizer::{AudioHints, AudioNormalizer, resolve_extension};
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{ElevenLabsSpeechProvider, OpenAISpeechProvider};
pub use synthesis::SynthesisGateway;
pub use transcription::TranscriptionGateway;
pub use types::{AudioFormat, StagedAudio, SynthesizedAudio, Transcription};
