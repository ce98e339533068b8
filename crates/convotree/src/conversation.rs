//! Turning tree paths into completion requests.

use crate::error::ResponderError;
use crate::responder::{ChatMessage, CompletionRequest, Responder, Role};
use crate::store::PathEntry;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_MODE: &str = "mock";
pub const DEFAULT_ERROR_CONTENT: &str = "Error: Couldn't generate AI response";

/// Settings for how requests are built and how failures read in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Always sent as the first message.
    pub system_prompt: String,
    /// Passed through to the responder to pick a backend or model.
    pub mode: String,
    /// Stored as the content of an AI node whose request failed.
    pub error_content: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            mode: DEFAULT_MODE.to_string(),
            error_content: DEFAULT_ERROR_CONTENT.to_string(),
        }
    }
}

impl ConversationConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_error_content(mut self, content: impl Into<String>) -> Self {
        self.error_content = content.into();
        self
    }
}

/// Builds message sequences from tree paths and asks a [`Responder`] for
/// the next assistant turn.
#[derive(Debug, Clone)]
pub struct ConversationService<R> {
    responder: R,
    config: ConversationConfig,
}

impl<R: Responder> ConversationService<R> {
    pub fn new(responder: R) -> Self {
        Self::with_config(responder, ConversationConfig::default())
    }

    pub fn with_config(responder: R, config: ConversationConfig) -> Self {
        Self { responder, config }
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    /// System prompt, then every entry of `path`, in order.
    ///
    /// User entries keep the `user` role; everything else is sent as
    /// `assistant`, including the empty root placeholder.
    pub fn messages_for_path(&self, path: &[PathEntry]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(path.len() + 2);
        messages.push(ChatMessage::system(self.config.system_prompt.as_str()));
        messages.extend(path.iter().map(|entry| {
            let role = match entry.role {
                Role::User => Role::User,
                _ => Role::Assistant,
            };
            ChatMessage::new(role, entry.content.as_str())
        }));
        messages
    }

    /// Messages for a new assistant turn under the last node of
    /// `path_to_parent`, with `new_user_content` as the final user message.
    pub fn build_request_messages(
        &self,
        path_to_parent: &[PathEntry],
        new_user_content: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = self.messages_for_path(path_to_parent);
        messages.push(ChatMessage::user(new_user_content));
        messages
    }

    /// Ask the responder, surfacing failures. Empty replies count as failures.
    pub fn try_request_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ResponderError> {
        let request = CompletionRequest {
            messages,
            mode: self.config.mode.clone(),
        };
        tracing::debug!(
            mode = %request.mode,
            messages = request.messages.len(),
            "requesting completion"
        );
        let content = self.responder.complete(&request)?;
        if content.trim().is_empty() {
            return Err(ResponderError::EmptyResponse);
        }
        Ok(content)
    }

    /// Ask the responder; on any failure return the configured error content
    /// so the caller can still commit a node.
    pub fn request_completion(&self, messages: Vec<ChatMessage>) -> String {
        match self.try_request_completion(messages) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "completion failed, storing error content");
                self.config.error_content.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::responder::from_fn;
    use std::cell::RefCell;

    fn entry(id: u64, role: Role, content: &str) -> PathEntry {
        PathEntry {
            id: NodeId(id),
            role,
            content: content.to_string(),
        }
    }

    fn sample_path() -> Vec<PathEntry> {
        vec![
            entry(0, Role::Assistant, ""),
            entry(1, Role::User, "hi"),
            entry(2, Role::Assistant, "Hello"),
        ]
    }

    fn ok_responder(
        reply: &'static str,
    ) -> impl Fn(&CompletionRequest) -> Result<String, ResponderError> {
        move |_: &CompletionRequest| Ok(reply.to_string())
    }

    #[test]
    fn test_build_request_messages_order() {
        let service = ConversationService::new(from_fn(ok_responder("x")));
        let messages = service.build_request_messages(&sample_path(), "tell me more");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system(DEFAULT_SYSTEM_PROMPT),
                ChatMessage::assistant(""),
                ChatMessage::user("hi"),
                ChatMessage::assistant("Hello"),
                ChatMessage::user("tell me more"),
            ]
        );
    }

    #[test]
    fn test_system_message_never_duplicated() {
        let service = ConversationService::new(from_fn(ok_responder("x")));
        let mut path = sample_path();
        path.push(entry(3, Role::System, "stray"));
        let messages = service.build_request_messages(&path, "");
        let systems = messages.iter().filter(|m| m.role == Role::System).count();
        assert_eq!(systems, 1);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[4], ChatMessage::assistant("stray"));
    }

    #[test]
    fn test_messages_for_path_has_no_trailing_message() {
        let service = ConversationService::new(from_fn(ok_responder("x")));
        let messages = service.messages_for_path(&sample_path()[..2]);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], ChatMessage::user("hi"));
    }

    #[test]
    fn test_custom_system_prompt() {
        let config = ConversationConfig::default().with_system_prompt("Be terse.");
        let service = ConversationService::with_config(from_fn(ok_responder("x")), config);
        let messages = service.messages_for_path(&[]);
        assert_eq!(messages, vec![ChatMessage::system("Be terse.")]);
    }

    #[test]
    fn test_request_carries_mode() {
        let seen = RefCell::new(None);
        let responder = from_fn(|request: &CompletionRequest| {
            *seen.borrow_mut() = Some(request.clone());
            Ok("reply".to_string())
        });
        let config = ConversationConfig::default().with_mode("openai");
        let service = ConversationService::with_config(responder, config);
        let content = service.request_completion(vec![ChatMessage::user("hi")]);
        assert_eq!(content, "reply");
        let request = seen.borrow().clone().unwrap();
        assert_eq!(request.mode, "openai");
        assert_eq!(request.messages, vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn test_failure_becomes_error_content() {
        let service = ConversationService::new(from_fn(|_: &CompletionRequest| {
            Err(ResponderError::Transport("connection refused".into()))
        }));
        let content = service.request_completion(vec![ChatMessage::user("hi")]);
        assert_eq!(content, DEFAULT_ERROR_CONTENT);
    }

    #[test]
    fn test_empty_reply_is_a_failure() {
        let service = ConversationService::new(from_fn(ok_responder("   ")));
        let err = service
            .try_request_completion(vec![ChatMessage::user("hi")])
            .unwrap_err();
        assert!(matches!(err, ResponderError::EmptyResponse));

        let config = ConversationConfig::default().with_error_content("[no reply]");
        let service = ConversationService::with_config(from_fn(ok_responder("")), config);
        assert_eq!(
            service.request_completion(vec![ChatMessage::user("hi")]),
            "[no reply]"
        );
    }
}
