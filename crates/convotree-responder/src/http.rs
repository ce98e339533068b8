//! Shared plumbing for the HTTP responders.

use convotree::ResponderError;
use reqwest::blocking::{Client, Response};
use std::time::Duration;

pub(crate) fn client(timeout: Duration) -> Result<Client, ResponderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(transport)
}

pub(crate) fn transport(err: reqwest::Error) -> ResponderError {
    ResponderError::Transport(err.to_string())
}

/// The response body, or a [`ResponderError::Status`] for non-2xx replies.
pub(crate) fn read_body(response: Response) -> Result<String, ResponderError> {
    let status = response.status();
    let body = response.text().map_err(transport)?;
    if !status.is_success() {
        return Err(ResponderError::Status {
            status: status.as_u16(),
            body: error_detail(&body),
        });
    }
    Ok(body)
}

/// Pull the human-readable part out of an error body.
///
/// Understands `{"detail": "…"}` (chat backends) and
/// `{"error": {"message": "…"}}` (OpenAI-compatible APIs); anything else is
/// returned trimmed.
pub(crate) fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .or_else(|| value.pointer("/error/message").and_then(|m| m.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_backend() {
        assert_eq!(
            error_detail(r#"{"detail": "API key for openai not found"}"#),
            "API key for openai not found"
        );
    }

    #[test]
    fn test_error_detail_openai() {
        assert_eq!(
            error_detail(r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#),
            "Incorrect API key"
        );
    }

    #[test]
    fn test_error_detail_plain() {
        assert_eq!(error_detail("  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_detail(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }
}
