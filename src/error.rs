//! Error types for the generation workflow.

use std::time::Duration;

/// Message shown to the user for every failed generation attempt.
///
/// Provider detail (status codes, safety blocks, decode failures) is logged,
/// never surfaced through this message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate image. Please try again.";

/// Longest provider error body kept for logging.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while collecting inputs or generating an image.
#[derive(Debug, thiserror::Error)]
pub enum DeemgError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Quota or rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider answered, but not with anything usable.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 or data-URL input.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (reading an upload, saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Location is not part of the catalog.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// Generation was triggered before both images and a mode were chosen.
    #[error("not ready to generate: {0}")]
    NotReady(&'static str),

    /// A generation request is already outstanding.
    #[error("a generation request is already in flight")]
    GenerationInFlight,

    /// Collapsed failure of a generation attempt.
    #[error("{}", GENERIC_FAILURE_MESSAGE)]
    GenerationFailed,
}

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, DeemgError>;

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Trims a provider error body to something fit for a log line.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_error_display() {
        let err = DeemgError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = DeemgError::ContentBlocked("Safety filter triggered".into());
        assert_eq!(err.to_string(), "content blocked: Safety filter triggered");
    }

    #[test]
    fn test_generation_failed_is_generic() {
        assert_eq!(
            DeemgError::GenerationFailed.to_string(),
            GENERIC_FAILURE_MESSAGE
        );
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 30 "));
        assert_eq!(parse_retry_after(&headers), Some(30));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_sanitize_error_message() {
        assert_eq!(
            sanitize_error_message("  quota\n exceeded\t "),
            "quota exceeded"
        );

        let long = "x".repeat(MAX_ERROR_MESSAGE_LEN + 10);
        let sanitized = sanitize_error_message(&long);
        assert_eq!(sanitized.len(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(sanitized.ends_with("..."));
    }
}
