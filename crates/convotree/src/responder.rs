//! The boundary to whatever produces assistant content.
//!
//! Implementations live outside this crate (see `convotree-responder`);
//! [`from_fn`] covers the simple in-process case.

use crate::error::ResponderError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// What a responder is asked to answer.
///
/// Serializes to the chat backend's wire shape:
///
/// ```json
/// { "messages": [{ "role": "system", "content": "…" }, …], "llm_choice": "mock" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,

    /// Which backend or model should answer.
    #[serde(rename = "llm_choice")]
    pub mode: String,
}

/// Successful reply from a chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub response: String,
}

/// Produces assistant content for a message sequence.
///
/// Calls are synchronous: the caller waits for the reply (or the failure)
/// before touching the tree again.
pub trait Responder {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError>;
}

impl<R: Responder + ?Sized> Responder for Box<R> {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        (**self).complete(request)
    }
}

impl<R: Responder + ?Sized> Responder for &R {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        (**self).complete(request)
    }
}

/// A responder backed by a closure.
#[derive(Clone)]
pub struct FnResponder<F>(F);

impl<F> fmt::Debug for FnResponder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResponder").finish_non_exhaustive()
    }
}

impl<F> Responder for FnResponder<F>
where
    F: Fn(&CompletionRequest) -> Result<String, ResponderError>,
{
    fn complete(&self, request: &CompletionRequest) -> Result<String, ResponderError> {
        (self.0)(request)
    }
}

/// Wrap a closure as a [`Responder`].
pub fn from_fn<F>(f: F) -> FnResponder<F>
where
    F: Fn(&CompletionRequest) -> Result<String, ResponderError>,
{
    FnResponder(f)
}
