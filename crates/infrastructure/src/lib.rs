//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of the
//! `ai_speech` and `ai_core` gateways, and loads the process configuration.

pub mod adapters;
pub mod config;

pub use adapters::*;
pub use config::{AppConfig, ProviderKeys, ServerConfig};
