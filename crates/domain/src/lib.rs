//! Domain layer for the voice gateway
//!
//! Contains the value objects shared by every layer: the provider-assigned
//! conversation thread identifier and the closed set of voice synthesis
//! providers. This layer has no I/O and defines the ubiquitous language.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::*;
