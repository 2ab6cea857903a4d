//! Shared helpers for the upload and audio handlers

use std::str::FromStr;

use application::{AudioUpload, SpeechAudio};
use axum::{
    extract::Multipart,
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use domain::{ThreadId, VoiceProvider};
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

/// Response header carrying the assistant thread of an audio reply
pub const THREAD_ID_HEADER: &str = "X-Thread-ID";

/// Optional query parameters of the upload and audio endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AudioQuery {
    /// Assistant thread to continue. Used when the body carries no valid
    /// thread; if neither is valid a new thread is started.
    pub thread_id: Option<String>,
    /// Synthesis provider: `elevenlabs` or `openai`
    pub provider: Option<String>,
}

/// First candidate that is a well-formed thread id
///
/// A malformed value never hides a valid one from a later source.
pub fn first_valid_thread_id<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|raw| ThreadId::parse_lenient(Some(*raw)).is_some())
}

/// Multipart body accepted by the upload endpoints
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AudioUploadForm {
    /// Audio file; its content type must start with `audio/`
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Assistant thread to continue
    pub thread_id: Option<String>,
    /// Synthesis provider: `elevenlabs` or `openai`
    pub provider: Option<String>,
}

/// Parsed upload form
#[derive(Debug)]
pub struct AudioForm {
    pub upload: AudioUpload,
    pub thread_id: Option<String>,
    pub provider: Option<String>,
}

impl AudioForm {
    /// Valid form field first, then the query string
    pub fn thread_id<'a>(&'a self, query: &'a AudioQuery) -> Option<&'a str> {
        first_valid_thread_id([self.thread_id.as_deref(), query.thread_id.as_deref()])
    }

    /// Form field first, then the query string
    pub fn provider(&self, query: &AudioQuery) -> Result<Option<VoiceProvider>, ApiError> {
        parse_provider(self.provider.as_deref().or(query.provider.as_deref()))
    }
}

fn multipart_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {err}"))
}

/// Read the `file` field and the optional `thread_id` and `provider` fields
///
/// Rejects the request before any provider is contacted when the file is
/// missing or its content type is not `audio/*`.
pub async fn read_audio_form(mut multipart: Multipart) -> Result<AudioForm, ApiError> {
    let mut upload = None;
    let mut thread_id = None;
    let mut provider = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(ToString::to_string);
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;

                let mut audio = AudioUpload::new(data.to_vec());
                if let Some(filename) = filename {
                    audio = audio.with_filename(filename);
                }
                if let Some(content_type) = content_type {
                    audio = audio.with_content_type(content_type);
                }
                upload = Some(audio);
            },
            Some("thread_id") => thread_id = Some(field.text().await.map_err(multipart_error)?),
            Some("provider") => provider = Some(field.text().await.map_err(multipart_error)?),
            other => debug!(field = ?other, "Ignoring unknown multipart field"),
        }
    }

    let upload =
        upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    if !upload.is_audio() {
        return Err(ApiError::not_audio());
    }

    Ok(AudioForm {
        upload,
        thread_id,
        provider,
    })
}

/// Parse an optional provider name; blank means the configured default
pub fn parse_provider(raw: Option<&str>) -> Result<Option<VoiceProvider>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(name) => VoiceProvider::from_str(name)
            .map(Some)
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

/// Return synthesized audio as a file download
pub fn audio_attachment(audio: SpeechAudio, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={filename}"))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(&audio.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("audio/mpeg"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio.data,
    )
        .into_response()
}

/// Attach the thread header to an audio reply
pub fn with_thread_header(mut response: Response, thread_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(thread_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-thread-id"), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn blank_provider_means_default() {
        assert_eq!(parse_provider(None).unwrap(), None);
        assert_eq!(parse_provider(Some("  ")).unwrap(), None);
    }

    #[test]
    fn known_providers_parse() {
        assert_eq!(
            parse_provider(Some("openai")).unwrap(),
            Some(VoiceProvider::OpenAi)
        );
        assert_eq!(
            parse_provider(Some("elevenlabs")).unwrap(),
            Some(VoiceProvider::ElevenLabs)
        );
    }

    #[test]
    fn unknown_provider_is_bad_request() {
        assert!(matches!(
            parse_provider(Some("polly")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn form_values_take_precedence_over_query() {
        let form = AudioForm {
            upload: AudioUpload::new(Vec::new()),
            thread_id: Some("thread_form".to_string()),
            provider: None,
        };
        let query = AudioQuery {
            thread_id: Some("thread_query".to_string()),
            provider: Some("openai".to_string()),
        };

        assert_eq!(form.thread_id(&query), Some("thread_form"));
        assert_eq!(form.provider(&query).unwrap(), Some(VoiceProvider::OpenAi));
    }

    #[test]
    fn malformed_form_thread_falls_back_to_query() {
        let form = AudioForm {
            upload: AudioUpload::new(Vec::new()),
            thread_id: Some("not-a-thread".to_string()),
            provider: None,
        };
        let query = AudioQuery {
            thread_id: Some("thread_query".to_string()),
            provider: None,
        };

        assert_eq!(form.thread_id(&query), Some("thread_query"));
    }

    #[test]
    fn first_valid_thread_id_skips_blank_and_malformed() {
        assert_eq!(
            first_valid_thread_id([Some(" "), None, Some("nope"), Some("thread_ok")]),
            Some("thread_ok")
        );
        assert_eq!(first_valid_thread_id([Some("nope"), None]), None);
    }

    #[test]
    fn attachment_headers() {
        let audio = SpeechAudio {
            data: b"ID3".to_vec(),
            content_type: "audio/mpeg".to_string(),
        };
        let response = with_thread_header(audio_attachment(audio, "speech.mp3"), "thread_abc");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=speech.mp3"
        );
        assert_eq!(response.headers()[THREAD_ID_HEADER], "thread_abc");
    }
}
