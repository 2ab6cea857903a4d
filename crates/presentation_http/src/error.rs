//! API error handling
//!
//! Every failure is returned as a JSON `{error, code}` body. Provider
//! failures surface as 500 with the endpoint's context prefix and the
//! underlying message; when detail exposure is disabled, messages that look
//! like they carry paths, hosts, or credentials are replaced with a generic
//! one.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use utoipa::ToSchema;

/// Whether error details may be returned to callers
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

const GENERIC_MESSAGE: &str = "An error occurred processing your request";

/// Configure whether internal error details are included in responses
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// Sanitize an error message according to the global exposure flag
fn sanitize_error_message(msg: &str) -> String {
    sanitize_with(msg, should_expose_details())
}

/// Remove file paths, network details, and credentials from `msg` unless
/// `expose` is set
fn sanitize_with(msg: &str, expose: bool) -> String {
    if expose {
        return msg.to_string();
    }

    let sensitive_patterns = [
        // File paths
        "/home/",
        "/Users/",
        "/var/",
        "/tmp/",
        "/etc/",
        "\\Users\\",
        "C:\\",
        // Credentials
        "sk-",
        "bearer ",
        "xi-api-key",
        // Stack trace indicators
        "stack backtrace",
        "panicked at",
        ".rs:",
        // Connection details
        "connection refused",
        "ECONNREFUSED",
        "127.0.0.1",
        "localhost:",
    ];

    let msg_lower = msg.to_lowercase();
    if sensitive_patterns
        .iter()
        .any(|pattern| msg_lower.contains(&pattern.to_lowercase()))
    {
        return GENERIC_MESSAGE.to_string();
    }

    if msg.contains("://") {
        return GENERIC_MESSAGE.to_string();
    }

    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap an application error with the endpoint's context prefix
    ///
    /// Domain errors describe bad input and stay 400; everything else is a
    /// 500 carrying `"{context}: {err}"`.
    pub fn with_context(context: &str, err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            other => Self::Internal(format!("{context}: {other}")),
        }
    }

    /// Rejection for uploads that are not audio
    pub fn not_audio() -> Self {
        Self::BadRequest("Only audio files can be uploaded.".to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    sanitize_error_message(msg),
                )
            },
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    #[test]
    fn api_error_messages() {
        assert_eq!(
            ApiError::BadRequest("invalid input".to_string()).to_string(),
            "Bad request: invalid input"
        );
        assert_eq!(
            ApiError::Internal("unexpected".to_string()).to_string(),
            "Internal error: unexpected"
        );
    }

    #[test]
    fn error_response_serialization() {
        let resp = ErrorResponse {
            error: "Bad request".to_string(),
            code: "bad_request".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"], "Bad request");
        assert_eq!(json["code"], "bad_request");
    }

    #[test]
    fn with_context_prefixes_provider_errors() {
        let err = ApiError::with_context(
            "Error converting text to speech",
            ApplicationError::Speech("quota exceeded".to_string()),
        );
        let ApiError::Internal(msg) = err else {
            unreachable!("Expected Internal");
        };
        assert_eq!(
            msg,
            "Error converting text to speech: Speech error: quota exceeded"
        );
    }

    #[test]
    fn with_context_keeps_domain_errors_as_bad_request() {
        let err = ApiError::with_context(
            "Error getting assistant response",
            ApplicationError::Domain(DomainError::InvalidThreadId("x".to_string())),
        );
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn application_errors_convert_to_internal() {
        let rate_limited: ApiError = ApplicationError::RateLimited.into();
        assert!(matches!(rate_limited, ApiError::Internal(_)));

        let inference: ApiError = ApplicationError::Inference("run failed".to_string()).into();
        assert!(matches!(inference, ApiError::Internal(msg) if msg.contains("run failed")));
    }

    #[test]
    fn into_response_status_codes() {
        assert_eq!(
            ApiError::not_audio().into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("crash".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    mod sanitize {
        use super::*;

        #[test]
        fn hides_file_paths() {
            let msg = "Failed to stage audio in /tmp/voicegate-1234/input.m4a";
            assert_eq!(sanitize_with(msg, false), GENERIC_MESSAGE);
        }

        #[test]
        fn hides_urls_and_hosts() {
            let msg = "Fetch error: error sending request for url (https://files.example.com/a.mp3)";
            assert_eq!(sanitize_with(msg, false), GENERIC_MESSAGE);
        }

        #[test]
        fn hides_credentials() {
            let msg = "Incorrect API key provided: sk-abc123";
            assert_eq!(sanitize_with(msg, false), GENERIC_MESSAGE);
        }

        #[test]
        fn preserves_safe_messages() {
            let msg = "Error getting assistant response: Run ended with status: failed";
            assert_eq!(sanitize_with(msg, false), msg);
        }

        #[test]
        fn exposes_everything_when_enabled() {
            let msg = "Error at /home/user/.config/voicegate.toml";
            assert_eq!(sanitize_with(msg, true), msg);
        }
    }
}
