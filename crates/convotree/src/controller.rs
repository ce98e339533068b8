//! User-facing operations over the tree and the derived selection state.

use crate::conversation::{ConversationConfig, ConversationService};
use crate::error::TreeError;
use crate::node::{Node, NodeId, Sender};
use crate::responder::Responder;
use crate::snapshot::Snapshot;
use crate::store::{PathEntry, TreeStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which neighbour [`NavigationController::navigate_sibling`] moves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// Why an operation left the tree and the selection untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0} already has children; only leaves can be deepened")]
    NotALeaf(NodeId),

    #[error("the root has no parent and cannot gain siblings")]
    RootHasNoSiblings,

    #[error("a user message cannot be empty")]
    EmptyMessage,
}

impl From<TreeError> for Rejection {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(id) => Rejection::UnknownNode(id),
        }
    }
}

/// Result of a controller operation: the newly selected node, or the reason
/// nothing happened.
pub type Outcome = Result<NodeId, Rejection>;

/// Owns a conversation tree and the current selection.
///
/// Every operation either moves the selection (possibly growing the tree on
/// the way) or returns a [`Rejection`] with no side effects. The path is
/// recomputed whenever the selection moves, so [`path`](Self::path) always
/// ends at [`selected`](Self::selected).
///
/// Operations that need assistant content call the responder synchronously
/// and always commit a node: failed requests store the configured error
/// content instead.
#[derive(Debug)]
pub struct NavigationController<R> {
    store: TreeStore,
    conversation: ConversationService<R>,
    selected: NodeId,
    path: Vec<PathEntry>,
}

impl<R: Responder> NavigationController<R> {
    pub fn new(responder: R) -> Self {
        Self::with_config(responder, ConversationConfig::default())
    }

    pub fn with_config(responder: R, config: ConversationConfig) -> Self {
        Self::from_parts(
            TreeStore::new(),
            ConversationService::with_config(responder, config),
        )
    }

    /// Drive an existing tree, starting with the root selected.
    pub fn from_parts(store: TreeStore, conversation: ConversationService<R>) -> Self {
        let path = store.find_path_to_node(NodeId::ROOT).unwrap_or_default();
        Self {
            store,
            conversation,
            selected: NodeId::ROOT,
            path,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn conversation(&self) -> &ConversationService<R> {
        &self.conversation
    }

    pub fn selected(&self) -> NodeId {
        self.selected
    }

    pub fn selected_node(&self) -> &Node {
        self.store
            .get(self.selected)
            .unwrap_or_else(|| self.store.root())
    }

    /// Root-to-selection path.
    pub fn path(&self) -> &[PathEntry] {
        &self.path
    }

    /// Whether the selection is a leaf and can be deepened.
    pub fn can_deepen(&self) -> bool {
        self.selected_node().is_leaf()
    }

    /// Whether `id` has at least one sibling to step to.
    pub fn has_siblings(&self, id: NodeId) -> bool {
        matches!(self.store.find_parent(id), Ok(Some(parent)) if parent.children().len() > 1)
    }

    /// Serializable view of the tree, the selection and the path.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.store, self.selected, &self.path)
    }

    /// Move the selection to `id`.
    pub fn select(&mut self, id: NodeId) -> Outcome {
        self.apply("select", |this| this.set_selection(id))
    }

    /// Continue the conversation from the leaf `id`.
    ///
    /// Under an AI node this adds a user turn with `content` and chains the
    /// assistant's reply beneath it; under a user node it adds the
    /// assistant's reply directly.
    ///
    /// A user turn needs non-blank `content`: deepening an AI leaf with an
    /// empty message is rejected with [`Rejection::EmptyMessage`] rather than
    /// creating an empty user node. To get another reply without a new
    /// message, [`regenerate`](Self::regenerate) the AI leaf instead.
    pub fn deepen(&mut self, id: NodeId, content: &str) -> Outcome {
        self.apply("deepen", |this| {
            let node = this.store.find_node_by_id(id)?;
            if !node.is_leaf() {
                return Err(Rejection::NotALeaf(id));
            }
            match node.sender().opposite() {
                Sender::User => this.add_user_turn(id, content),
                Sender::Ai => this.add_ai_turn(id, content),
            }
        })
    }

    /// Add an alternative to `id` under the same parent.
    ///
    /// A user node gets a new user sibling with its own reply; an AI node
    /// gets a freshly generated AI sibling.
    pub fn broaden(&mut self, id: NodeId, content: &str) -> Outcome {
        self.apply("broaden", |this| this.try_broaden(id, content))
    }

    /// Re-roll the AI node `id` as a new sibling.
    pub fn regenerate(&mut self, id: NodeId) -> Outcome {
        self.apply("regenerate", |this| {
            this.check_broaden(id, "")?;
            this.set_selection(id)?;
            this.try_broaden(id, "")
        })
    }

    /// Branch off `id` with `content`. The original node is kept as is.
    pub fn edit(&mut self, id: NodeId, content: &str) -> Outcome {
        self.apply("edit", |this| {
            this.check_broaden(id, content)?;
            this.set_selection(id)?;
            this.try_broaden(id, content)
        })
    }

    /// Step to the left or right sibling of `id`, wrapping around, and
    /// select that sibling's deepest first-child leaf.
    pub fn navigate_sibling(&mut self, id: NodeId, direction: Direction) -> Outcome {
        self.apply("navigate_sibling", |this| {
            let parent = this
                .store
                .find_parent(id)?
                .ok_or(Rejection::RootHasNoSiblings)?;
            let siblings = parent.children();
            let index = siblings
                .iter()
                .position(|&sibling| sibling == id)
                .ok_or(Rejection::UnknownNode(id))?;
            let len = siblings.len();
            let next = match direction {
                Direction::Left => {
                    if index > 0 {
                        index - 1
                    } else {
                        len - 1
                    }
                }
                Direction::Right => (index + 1) % len,
            };
            let target = this.store.deepest_first_leaf(siblings[next])?;
            this.set_selection(target)
        })
    }

    /// Deepen the current selection.
    pub fn submit(&mut self, content: &str) -> Outcome {
        self.deepen(self.selected, content)
    }

    fn apply(&mut self, op: &'static str, f: impl FnOnce(&mut Self) -> Outcome) -> Outcome {
        let outcome = f(self);
        match &outcome {
            Ok(selected) => {
                tracing::info!(op, %selected, nodes = self.store.node_count(), "applied");
            }
            Err(rejection) => {
                tracing::warn!(op, %rejection, "rejected");
            }
        }
        outcome
    }

    fn set_selection(&mut self, id: NodeId) -> Outcome {
        self.path = self.store.find_path_to_node(id)?;
        self.selected = id;
        Ok(id)
    }

    /// Everything [`try_broaden`](Self::try_broaden) would reject, checked
    /// before any side effect.
    fn check_broaden(&self, id: NodeId, content: &str) -> Result<(), Rejection> {
        let node = self.store.find_node_by_id(id)?;
        if node.is_root() {
            return Err(Rejection::RootHasNoSiblings);
        }
        if node.sender() == Sender::User && content.trim().is_empty() {
            return Err(Rejection::EmptyMessage);
        }
        Ok(())
    }

    fn try_broaden(&mut self, id: NodeId, content: &str) -> Outcome {
        let node = self.store.find_node_by_id(id)?;
        let parent = node.parent().ok_or(Rejection::RootHasNoSiblings)?;
        match node.sender() {
            Sender::User => self.add_user_turn(parent, content),
            Sender::Ai => self.add_ai_turn(parent, content),
        }
    }

    /// User node under `parent`, then the assistant's reply under it.
    fn add_user_turn(&mut self, parent: NodeId, content: &str) -> Outcome {
        if content.trim().is_empty() {
            return Err(Rejection::EmptyMessage);
        }
        let user = self.store.append_child(parent, Sender::User, content)?;
        self.set_selection(user)?;

        let messages = self.conversation.messages_for_path(&self.path);
        let reply = self.conversation.request_completion(messages);
        let ai = self.store.append_child(user, Sender::Ai, reply)?;
        self.set_selection(ai)
    }

    /// Assistant reply under `parent`, fetched before the node is inserted.
    fn add_ai_turn(&mut self, parent: NodeId, content: &str) -> Outcome {
        let path_to_parent = self.store.find_path_to_node(parent)?;
        let messages = self
            .conversation
            .build_request_messages(&path_to_parent, content);
        let reply = self.conversation.request_completion(messages);
        let ai = self.store.append_child(parent, Sender::Ai, reply)?;
        self.set_selection(ai)
    }
}
