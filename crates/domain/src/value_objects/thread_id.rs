//! Conversation thread identifier assigned by the assistant provider
//!
//! Threads are created and stored entirely by the provider. The service only
//! holds the identifier the caller echoes back between requests.
//!
//! # Examples
//!
//! ```
//! use domain::ThreadId;
//!
//! let id = ThreadId::new("thread_abc123").unwrap();
//! assert_eq!(id.as_str(), "thread_abc123");
//!
//! // Identifiers without the provider prefix are rejected
//! assert!(ThreadId::new("abc123").is_err());
//!
//! // ...or treated as absent at the request boundary
//! assert!(ThreadId::parse_lenient(Some("not-a-thread")).is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Prefix every provider thread identifier starts with
pub const THREAD_ID_PREFIX: &str = "thread_";

/// A validated provider thread identifier (`thread_<token>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThreadId(String);

impl ThreadId {
    /// Create a thread ID, validating the `thread_` prefix and token
    ///
    /// The token must be non-empty and consist of ASCII alphanumerics,
    /// `_` or `-` so it can be placed in a URL path segment as-is.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidThreadId`] if the format is invalid.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let value = id.into();
        let trimmed = value.trim();

        let valid = trimmed.strip_prefix(THREAD_ID_PREFIX).is_some_and(|token| {
            !token.is_empty()
                && token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

        if !valid {
            return Err(DomainError::InvalidThreadId(value));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Parse an optional caller-supplied identifier, treating anything
    /// invalid as absent
    ///
    /// A caller that sends a malformed identifier gets a fresh thread
    /// instead of an error.
    #[must_use]
    pub fn parse_lenient(id: Option<&str>) -> Option<Self> {
        id.and_then(|raw| Self::new(raw).ok())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ThreadId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThreadId> for String {
    fn from(id: ThreadId) -> Self {
        id.0
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
