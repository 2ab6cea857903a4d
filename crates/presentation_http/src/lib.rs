//! Voicegate HTTP presentation layer
//!
//! Routes, handlers, and middleware exposing the speech and conversation
//! services over HTTP.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{RequestIdLayer, ValidatedJson, ValidationError};
pub use routes::create_router;
pub use state::AppState;
