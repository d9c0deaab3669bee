//! # Selection / Focus Coordination
//!
//! At most one node per tree is "active" for detail editing. Selecting a
//! node expands it and its structural ancestors so it is visible;
//! collapse state is otherwise sticky and user-controlled.

use domus_automation::Sequence;
use domus_common::collect_keys;
use std::collections::HashSet;

/// Host-level panel notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    OpenDetail { key: String },
    CloseDetail,
}

#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<String>,
    expanded: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    /// Sticky, user-controlled expand/collapse
    pub fn set_expanded(&mut self, key: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(key.to_string());
        } else {
            self.expanded.remove(key);
        }
    }

    /// Select a node, expanding it and all ancestors
    ///
    /// Returns `None` without changing state when the key is not in the
    /// tree.
    pub fn select(&mut self, root: &Sequence, key: &str) -> Option<SelectionEvent> {
        let ancestors = ancestors_of(root, key)?;
        for ancestor in ancestors {
            self.expanded.insert(ancestor);
        }
        self.expanded.insert(key.to_string());
        self.selected = Some(key.to_string());
        Some(SelectionEvent::OpenDetail {
            key: key.to_string(),
        })
    }

    /// Deselect; collapses nothing
    pub fn clear(&mut self) -> Option<SelectionEvent> {
        self.selected.take().map(|_| SelectionEvent::CloseDetail)
    }

    /// Drop state for nodes that no longer exist in the tree
    ///
    /// Reorders keep keys alive, so selection survives them; a deleted
    /// or cut node loses its selection and expansion entries.
    pub fn retain(&mut self, root: &Sequence) -> Option<SelectionEvent> {
        let alive: HashSet<String> = collect_keys(root).into_iter().collect();
        self.expanded.retain(|key| alive.contains(key));
        match &self.selected {
            Some(key) if !alive.contains(key) => self.clear(),
            _ => None,
        }
    }
}

/// Keys of the structural ancestors of a node, innermost first
fn ancestors_of(root: &Sequence, key: &str) -> Option<Vec<String>> {
    for node in root {
        if node.key == key {
            return Some(Vec::new());
        }
        for sequence in node.children.values() {
            if let Some(mut path) = ancestors_of(sequence, key) {
                path.push(node.key.clone());
                return Some(path);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::decompose;
    use domus_automation::{Config, KeyGenerator, NodeSort, Slot};
    use serde_json::json;

    fn tree() -> Sequence {
        let mut keys = KeyGenerator::new("test");
        let config = |value: serde_json::Value| -> Config {
            match value {
                serde_json::Value::Object(map) => map,
                _ => panic!("expected object"),
            }
        };

        vec![
            decompose(NodeSort::Action, config(json!({"delay": ""})), &mut keys),
            decompose(
                NodeSort::Action,
                config(json!({
                    "if": [{"condition": "sun", "after": "sunset"}],
                    "then": [{"scene": "scene.evening"}]
                })),
                &mut keys,
            ),
        ]
    }

    #[test]
    fn test_select_expands_ancestors() {
        let root = tree();
        let block_key = root[1].key.clone();
        let nested_key = root[1].children[&Slot::Then][0].key.clone();

        let mut selection = Selection::new();
        let event = selection.select(&root, &nested_key).unwrap();

        assert_eq!(
            event,
            SelectionEvent::OpenDetail {
                key: nested_key.clone()
            }
        );
        assert!(selection.is_expanded(&block_key));
        assert!(selection.is_expanded(&nested_key));
        assert_eq!(selection.selected(), Some(nested_key.as_str()));
    }

    #[test]
    fn test_deselect_keeps_expansion() {
        let root = tree();
        let nested_key = root[1].children[&Slot::Then][0].key.clone();

        let mut selection = Selection::new();
        selection.select(&root, &nested_key);
        let event = selection.clear();

        assert_eq!(event, Some(SelectionEvent::CloseDetail));
        assert!(selection.is_expanded(&nested_key));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_selection_survives_reorder() {
        let mut root = tree();
        let nested_key = root[1].children[&Slot::Then][0].key.clone();

        let mut selection = Selection::new();
        selection.select(&root, &nested_key);

        root.swap(0, 1);
        assert_eq!(selection.retain(&root), None);
        assert_eq!(selection.selected(), Some(nested_key.as_str()));
    }

    #[test]
    fn test_selection_cleared_on_delete() {
        let mut root = tree();
        let nested_key = root[1].children[&Slot::Then][0].key.clone();

        let mut selection = Selection::new();
        selection.select(&root, &nested_key);

        root.remove(1);
        assert_eq!(selection.retain(&root), Some(SelectionEvent::CloseDetail));
        assert_eq!(selection.selected(), None);
        assert!(!selection.is_expanded(&nested_key));
    }

    #[test]
    fn test_select_unknown_key_is_a_noop() {
        let root = tree();
        let mut selection = Selection::new();

        assert_eq!(selection.select(&root, "no-such-key"), None);
        assert_eq!(selection.selected(), None);
    }
}
