//! Arena storage and structural queries for the conversation tree.

use crate::error::{Result, TreeError};
use crate::node::{Node, NodeId, Sender};
use crate::responder::Role;
use serde::{Deserialize, Serialize};

/// One entry of a root-to-node path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub id: NodeId,
    pub role: Role,
    pub content: String,
}

impl PathEntry {
    fn from_node(node: &Node) -> Self {
        Self {
            id: node.id,
            role: node.sender.role(),
            content: node.content.clone(),
        }
    }
}

/// Owns every node of one conversation tree.
///
/// Nodes are stored in creation order, so a node's id is also its slot in
/// the arena and the next id is simply the arena length. Parent links are
/// stored on each node, which makes upward walks (parent, path) direct
/// instead of a search from the root.
#[derive(Debug, Clone)]
pub struct TreeStore {
    nodes: Vec<Node>,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    /// A tree holding only the empty AI root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The id the next appended node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u64)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        id.index().and_then(|i| self.nodes.get(i))
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        id.index().and_then(|i| self.nodes.get_mut(i))
    }

    pub fn find_node_by_id(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(TreeError::NotFound(id))
    }

    /// The structural parent of `id`, or `Ok(None)` for the root.
    pub fn find_parent(&self, id: NodeId) -> Result<Option<&Node>> {
        let node = self.find_node_by_id(id)?;
        match node.parent {
            Some(parent) => self.find_node_by_id(parent).map(Some),
            None => Ok(None),
        }
    }

    /// Root-first path to `id`, inclusive on both ends.
    pub fn find_path_to_node(&self, id: NodeId) -> Result<Vec<PathEntry>> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.find_node_by_id(current)?;
            path.push(PathEntry::from_node(node));
            cursor = node.parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Append a new node as the last child of `parent` and return its id.
    ///
    /// The id is taken from the counter only once the parent resolves, so a
    /// failed append never consumes an id.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        sender: Sender,
        content: impl Into<String>,
    ) -> Result<NodeId> {
        let id = self.next_id();
        let parent_node = self.get_mut(parent).ok_or(TreeError::NotFound(parent))?;
        parent_node.children.push(id);
        self.nodes.push(Node::child(id, parent, sender, content.into()));
        tracing::debug!(%id, %parent, %sender, "appended node");
        Ok(id)
    }

    /// Follow first children down from `id` until reaching a leaf.
    pub fn deepest_first_leaf(&self, id: NodeId) -> Result<NodeId> {
        let mut node = self.find_node_by_id(id)?;
        while let Some(&first) = node.children.first() {
            node = self.find_node_by_id(first)?;
        }
        Ok(node.id)
    }

    /// Pre-order traversal from the root, children visited in order.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            store: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Ids of nodes whose content contains `needle`, ignoring case, in
    /// depth-first order. An empty needle matches nothing.
    pub fn search(&self, needle: &str) -> Vec<NodeId> {
        if needle.is_empty() {
            return Vec::new();
        }
        let needle = needle.to_lowercase();
        self.iter_depth_first()
            .filter(|node| node.content.to_lowercase().contains(&needle))
            .map(Node::id)
            .collect()
    }
}

/// Iterator returned by [`TreeStore::iter_depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a> {
    store: &'a TreeStore,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.store.get(id)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}
