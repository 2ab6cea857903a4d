//! Application layer - Use cases and orchestration
//!
//! Contains the port definitions the gateways are bound to and the services
//! that compose them into the operations the HTTP layer exposes.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
