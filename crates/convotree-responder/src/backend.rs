//! Responder for a chat backend speaking `{messages, llm_choice}` → `{response}`.

use crate::http;
use convotree::{CompletionRequest, CompletionResponse, Responder, ResponderError};
use reqwest::blocking::Client;
use std::time::Duration;

/// Posts each request to `<base>/chat`.
///
/// The backend decides which model answers from the request's mode
/// (`llm_choice` on the wire).
#[derive(Debug, Clone)]
pub struct BackendResponder {
    client: Client,
    url: String,
}

impl BackendResponder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResponderError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: chat_url(base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Responder for BackendResponder {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        tracing::debug!(url = %self.url, mode = %request.mode, "posting chat request");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(http::transport)?;
        let body = http::read_body(response)?;
        parse_response(&body)
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat", base_url.trim_end_matches('/'))
}

fn parse_response(body: &str) -> Result<String, ResponderError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ResponderError::Decode(e.to_string()))?;
    Ok(parsed.response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;
    use convotree::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("hi"),
            ],
            mode: "mock".into(),
        }
    }

    #[test]
    fn test_chat_url() {
        assert_eq!(chat_url("http://localhost:8000"), "http://localhost:8000/chat");
        assert_eq!(chat_url("http://localhost:8000/"), "http://localhost:8000/chat");
        let responder =
            BackendResponder::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(responder.url(), "http://localhost:8000/chat");
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_response(r#"{"response": "Hi!"}"#).unwrap(), "Hi!");
        assert!(matches!(
            parse_response(r#"{"reply": "Hi!"}"#),
            Err(ResponderError::Decode(_))
        ));
    }

    #[test]
    fn test_complete_round_trip() {
        let (base, server) = serve_once("200 OK", r#"{"response": "Hello from backend"}"#);
        let responder = BackendResponder::new(&base, Duration::from_secs(5)).unwrap();
        let reply = responder.complete(&request()).unwrap();
        assert_eq!(reply, "Hello from backend");

        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /chat "));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["llm_choice"], "mock");
        assert_eq!(sent["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_complete_reports_status() {
        let (base, _server) = serve_once(
            "400 Bad Request",
            r#"{"detail": "API key for openai not found"}"#,
        );
        let responder = BackendResponder::new(&base, Duration::from_secs(5)).unwrap();
        match responder.complete(&request()) {
            Err(ResponderError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "API key for openai not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
