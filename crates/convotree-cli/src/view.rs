//! Plain-text rendering of the tree and the selected path.

use convotree::{NodeId, PathEntry, TreeStore};
use std::fmt::Write;

const PREVIEW_CHARS: usize = 60;

/// One line per node, indented by depth. The selected node is marked `*`,
/// the rest of its path `>`.
pub fn render_tree(store: &TreeStore, path: &[PathEntry], selected: NodeId) -> String {
    let mut out = String::new();
    let mut stack = vec![(NodeId::ROOT, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let Ok(node) = store.find_node_by_id(id) else {
            continue;
        };
        let marker = if id == selected {
            '*'
        } else if path.iter().any(|entry| entry.id == id) {
            '>'
        } else {
            ' '
        };
        let content = if node.is_root() {
            "(root)".to_string()
        } else {
            preview(node.content())
        };
        let _ = writeln!(
            out,
            "{marker} {:indent$}[{id}] {}: {content}",
            "",
            node.sender(),
            indent = depth * 2
        );
        stack.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
    }
    out
}

/// The root-to-selection messages, root excluded.
pub fn render_path(path: &[PathEntry]) -> String {
    let mut out = String::new();
    for entry in path.iter().filter(|entry| !entry.id.is_root()) {
        let _ = writeln!(out, "[{}] {}: {}", entry.id, entry.role, entry.content);
    }
    out
}

/// First line of `content`, shortened to a fixed width.
pub fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() || content.lines().nth(1).is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convotree::Sender;

    fn sample() -> TreeStore {
        let mut store = TreeStore::new();
        let hi = store.append_child(NodeId::ROOT, Sender::User, "hi").unwrap();
        store.append_child(hi, Sender::Ai, "Hello").unwrap();
        store.append_child(hi, Sender::Ai, "Hey there").unwrap();
        store
    }

    #[test]
    fn test_render_tree_marks_selection_and_path() {
        let store = sample();
        let path = store.find_path_to_node(NodeId(3)).unwrap();
        let text = render_tree(&store, &path, NodeId(3));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "> [0] ai: (root)",
                ">   [1] user: hi",
                "      [2] ai: Hello",
                "*     [3] ai: Hey there",
            ]
        );
    }

    #[test]
    fn test_render_path_skips_root() {
        let store = sample();
        let path = store.find_path_to_node(NodeId(2)).unwrap();
        assert_eq!(render_path(&path), "[1] user: hi\n[2] assistant: Hello\n");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first…");
        let long = "x".repeat(80);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 1);
        assert_eq!(preview(""), "");
    }
}
