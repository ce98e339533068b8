#![doc = include_str!("../README.md")]

pub mod controller;
pub mod conversation;
pub mod error;
pub mod node;
pub mod responder;
pub mod snapshot;
pub mod store;

pub use controller::{Direction, NavigationController, Outcome, Rejection};
pub use conversation::{
    ConversationConfig, ConversationService, DEFAULT_ERROR_CONTENT, DEFAULT_MODE,
    DEFAULT_SYSTEM_PROMPT,
};
pub use error::{ResponderError, Result, TreeError};
pub use node::{Node, NodeId, Sender};
pub use responder::{
    ChatMessage, CompletionRequest, CompletionResponse, FnResponder, Responder, Role,
};
pub use snapshot::{NodeSnapshot, Snapshot};
pub use store::{DepthFirst, PathEntry, TreeStore};
