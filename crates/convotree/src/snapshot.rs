//! Serializable views of a tree and its selection, e.g. for feedback reports.

use crate::node::{NodeId, Sender};
use crate::store::{PathEntry, TreeStore};
use serde::{Deserialize, Serialize};

/// A node with its whole subtree inlined.
///
/// ```json
/// { "id": 1, "sender": "user", "content": "hi", "children": [ … ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub sender: Sender,
    pub content: String,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Inline the subtree rooted at `id`. Unknown ids yield `None`.
    pub fn of(store: &TreeStore, id: NodeId) -> Option<Self> {
        let node = store.get(id)?;
        let children = node
            .children()
            .iter()
            .filter_map(|&child| Self::of(store, child))
            .collect();
        Some(Self {
            id: node.id(),
            sender: node.sender(),
            content: node.content().to_string(),
            children,
        })
    }

    /// Number of nodes in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// The whole session state at one moment: `{tree, selectedNode, path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tree: NodeSnapshot,
    pub selected_node: NodeSnapshot,
    pub path: Vec<PathEntry>,
}

impl Snapshot {
    pub(crate) fn capture(store: &TreeStore, selected: NodeId, path: &[PathEntry]) -> Self {
        let tree = NodeSnapshot::of(store, NodeId::ROOT).unwrap_or_else(|| root_only(store));
        let selected_node = NodeSnapshot::of(store, selected).unwrap_or_else(|| tree.clone());
        Self {
            tree,
            selected_node,
            path: path.to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn root_only(store: &TreeStore) -> NodeSnapshot {
    let root = store.root();
    NodeSnapshot {
        id: root.id(),
        sender: root.sender(),
        content: root.content().to_string(),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TreeStore, Vec<PathEntry>) {
        let mut store = TreeStore::new();
        let hi = store.append_child(NodeId::ROOT, Sender::User, "hi").unwrap();
        let hello = store.append_child(hi, Sender::Ai, "Hello").unwrap();
        store.append_child(hi, Sender::Ai, "Hey").unwrap();
        let path = store.find_path_to_node(hello).unwrap();
        (store, path)
    }

    #[test]
    fn test_node_snapshot_nests_children_in_order() {
        let (store, _) = sample();
        let tree = NodeSnapshot::of(&store, NodeId::ROOT).unwrap();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.children.len(), 1);
        let hi = &tree.children[0];
        assert_eq!(hi.content, "hi");
        let contents: Vec<&str> = hi.children.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["Hello", "Hey"]);
        assert!(NodeSnapshot::of(&store, NodeId(10)).is_none());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let (store, path) = sample();
        let snapshot = Snapshot::capture(&store, NodeId(2), &path);
        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["selectedNode"]["id"], 2);
        assert_eq!(json["selectedNode"]["sender"], "ai");
        assert_eq!(json["tree"]["children"][0]["sender"], "user");
        assert_eq!(json["path"][1]["role"], "user");
        assert_eq!(json["path"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_snapshot_parses_back() {
        let (store, path) = sample();
        let snapshot = Snapshot::capture(&store, NodeId(2), &path);
        let back = Snapshot::from_json(&snapshot.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }
}
