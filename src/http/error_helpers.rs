//! Error handling utilities for HTTP responses and error context formatting.

use crate::errors::PfolioError;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// Maximum characters to include from error body in context messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Checks if an HTTP response is successful, returning it if so or an error otherwise.
///
/// # Errors
///
/// Returns [`PfolioError::Api`] with status code, server message and body
/// preview on non-success status.
pub async fn check_response(response: Response) -> Result<Response, PfolioError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(read_error_with_context(response).await)
    }
}

/// Reads an error response body and builds a [`PfolioError::Api`].
///
/// The body may be JSON carrying a `message` or `error` field, plain text, or
/// empty. Only the structured JSON fields become the server message; the raw
/// body is kept (truncated) for diagnostics. If the body cannot be read, the
/// preview describes the read failure.
pub async fn read_error_with_context(response: Response) -> PfolioError {
    let status_code = response.status().as_u16();

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error body: {}", e));

    api_error(status_code, &error_body)
}

pub(crate) fn api_error(status_code: u16, body: &str) -> PfolioError {
    PfolioError::Api {
        status_code,
        message: extract_server_message(body),
        body: truncate_for_context(body, ERROR_BODY_PREVIEW_LENGTH),
    }
}

/// Pulls a human-readable message out of a JSON error body.
///
/// Accepts `{"message": "..."}`, `{"error": "..."}`,
/// `{"error": {"message": "..."}}` and a bare JSON string. Anything else,
/// including non-JSON text, yields `None`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body.trim()).ok()?;
    let message = match &parsed {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| map.get("error").and_then(Value::as_str))
            .or_else(|| {
                map.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
            }),
        _ => None,
    }?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Maps a transport-level `reqwest` failure onto the error taxonomy.
///
/// Timeouts and connection failures must stay distinguishable: only the
/// former is worth a wake-up retry.
pub fn transport_error(error: reqwest::Error, timeout: Duration) -> PfolioError {
    if error.is_timeout() {
        PfolioError::Timeout(timeout)
    } else if error.is_builder() {
        PfolioError::InvalidInput(format!("Could not build request: {}", error))
    } else {
        PfolioError::Network(error)
    }
}

/// Formats JSON parsing context by including a preview of the raw JSON.
pub fn format_json_parse_error(json_str: &str, error: &serde_json::Error) -> String {
    let preview = truncate_for_context(json_str, ERROR_BODY_PREVIEW_LENGTH);
    format!("JSON parse error: {} | Context: {}", error, preview)
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &s[..truncate_at])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_field() {
        let body = r#"{"message": "Skill not found"}"#;
        assert_eq!(extract_server_message(body).as_deref(), Some("Skill not found"));
    }

    #[test]
    fn test_extract_error_field() {
        let body = r#"{"error": "Bad Request", "status": 400}"#;
        assert_eq!(extract_server_message(body).as_deref(), Some("Bad Request"));
    }

    #[test]
    fn test_message_takes_precedence_over_error() {
        let body = r#"{"error": "Bad Request", "message": "Email is invalid"}"#;
        assert_eq!(extract_server_message(body).as_deref(), Some("Email is invalid"));
    }

    #[test]
    fn test_extract_nested_error_message() {
        let body = r#"{"error": {"code": 401, "message": "Token expired"}}"#;
        assert_eq!(extract_server_message(body).as_deref(), Some("Token expired"));
    }

    #[test]
    fn test_extract_bare_json_string() {
        assert_eq!(
            extract_server_message(r#""Username is required""#).as_deref(),
            Some("Username is required")
        );
    }

    #[test]
    fn test_plain_text_body_has_no_message() {
        assert_eq!(extract_server_message("Not Found"), None);
        assert_eq!(extract_server_message("<html>404</html>"), None);
        assert_eq!(extract_server_message(""), None);
    }

    #[test]
    fn test_blank_message_is_ignored() {
        assert_eq!(extract_server_message(r#"{"message": "  "}"#), None);
        assert_eq!(extract_server_message(r#"{"message": 42}"#), None);
    }

    #[test]
    fn test_api_error_keeps_body_preview() {
        let body = "x".repeat(500);
        match api_error(502, &body) {
            PfolioError::Api {
                status_code,
                message,
                body,
            } => {
                assert_eq!(status_code, 502);
                assert_eq!(message, None);
                assert_eq!(body.len(), 203);
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_for_context_short_string() {
        assert_eq!(truncate_for_context("Short", 100), "Short");
    }

    #[test]
    fn test_truncate_for_context_utf8_boundary() {
        let emoji_str = "x".repeat(198) + "🎉";
        let result = truncate_for_context(&emoji_str, 200);
        assert_eq!(result.len(), 201);
        assert!(result.ends_with("..."));
        assert!(!result.contains('🎉'));
    }

    #[test]
    fn test_format_json_parse_error() {
        let json = r#"{"invalid": }"#;
        let err = serde_json::from_str::<Value>(json).unwrap_err();
        let result = format_json_parse_error(json, &err);
        assert!(result.contains("JSON parse error"));
        assert!(result.contains(json));
    }
}
