//! Responder for OpenAI-compatible chat completion APIs.

use crate::http;
use convotree::{ChatMessage, CompletionRequest, Responder, ResponderError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Talks to a chat completions endpoint directly with a bearer key.
///
/// A missing key is not a construction error: every request fails with
/// [`ResponderError::MissingApiKey`] so the tree records it as error content.
#[derive(Debug, Clone)]
pub struct OpenAiResponder {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiResponder {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ResponderError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: url.into(),
            model: model.into(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Responder for OpenAiResponder {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ResponderError::MissingApiKey("openai".to_string()))?;
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
        };
        tracing::debug!(url = %self.url, model = %self.model, "posting chat completion");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(http::transport)?;
        let body = http::read_body(response)?;
        parse_completion(&body)
    }
}

fn parse_completion(body: &str) -> Result<String, ResponderError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|e| ResponderError::Decode(e.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ResponderError::EmptyResponse)
}
