//! Nodes of the conversation tree.

use crate::responder::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a node within one tree.
///
/// Ids come from a counter that only moves forward, so they double as
/// creation order. The root is always [`NodeId::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    pub(crate) fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Who wrote a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Ai,
    User,
}

impl Sender {
    /// The sender expected on the next turn of a deepen-chain.
    pub fn opposite(self) -> Self {
        match self {
            Sender::Ai => Sender::User,
            Sender::User => Sender::Ai,
        }
    }

    /// Chat role used when this sender's content is sent to a responder.
    pub fn role(self) -> Role {
        match self {
            Sender::User => Role::User,
            Sender::Ai => Role::Assistant,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Ai => write!(f, "ai"),
            Sender::User => write!(f, "user"),
        }
    }
}

/// A single message in the tree.
///
/// Nodes live in the [`TreeStore`](crate::TreeStore) arena and refer to each
/// other by [`NodeId`]. Content is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) sender: Sender,
    pub(crate) content: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            sender: Sender::Ai,
            content: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn child(id: NodeId, parent: NodeId, sender: Sender, content: String) -> Self {
        Self {
            id,
            sender,
            content,
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Structural parent; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order. The order defines sibling adjacency.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_placeholder() {
        let root = Node::root();
        assert_eq!(root.id(), NodeId::ROOT);
        assert_eq!(root.sender(), Sender::Ai);
        assert!(root.content().is_empty());
        assert!(root.is_root());
        assert!(root.is_leaf());
    }

    #[test]
    fn test_sender_opposite() {
        assert_eq!(Sender::Ai.opposite(), Sender::User);
        assert_eq!(Sender::User.opposite(), Sender::Ai);
    }

    #[test]
    fn test_sender_role() {
        assert_eq!(Sender::User.role(), Role::User);
        assert_eq!(Sender::Ai.role(), Role::Assistant);
    }

    #[test]
    fn test_sender_serde() {
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        let back: Sender = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(back, Sender::User);
    }

    #[test]
    fn test_node_id_display_and_serde() {
        assert_eq!(NodeId(7).to_string(), "7");
        assert_eq!(serde_json::to_string(&NodeId(7)).unwrap(), "7");
        assert!(NodeId::ROOT.is_root());
        assert!(!NodeId::from(3).is_root());
    }
}
