use crate::node::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors from structural queries and mutations on a [`TreeStore`](crate::TreeStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
}

/// Errors a [`Responder`](crate::Responder) can report.
///
/// These never reach the tree: [`ConversationService`](crate::ConversationService)
/// converts every one of them into error content for the new node.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("responder returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("responder returned an empty response")]
    EmptyResponse,

    #[error("API key for {0} not found")]
    MissingApiKey(String),

    #[error("unknown responder mode: {0}")]
    UnknownMode(String),
}
