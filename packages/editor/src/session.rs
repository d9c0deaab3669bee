//! # Edit Session
//!
//! Owns the state a hosting panel needs to edit one automation: the
//! root sequence, the key generator, the clipboard, and the selection.
//! Every mutation funnels through `apply`, which resolves the target
//! nested sequence, applies copy-on-write, and bumps the version - one
//! whole-value change notification per mutation.

use crate::clipboard::Clipboard;
use crate::composition::{compose_all, decompose_all};
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationContext};
use crate::selection::{Selection, SelectionEvent};
use crate::sync::NodeEditor;
use domus_automation::{Codec, Config, KeyGenerator, Node, NodeSort, Registry, Sequence, Slot};
use domus_common::CommonResult;
use serde_json::Value;
use std::sync::Arc;

/// One step of a path into nested sequences
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub key: String,
    pub slot: Slot,
}

impl PathSegment {
    pub fn new(key: impl Into<String>, slot: Slot) -> Self {
        Self {
            key: key.into(),
            slot,
        }
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Whether the mutation removed the selected node
    pub selection_cleared: bool,
}

/// Editing state for one automation
pub struct EditSession {
    id: String,
    sort: NodeSort,
    root: Sequence,
    version: u64,
    keys: KeyGenerator,
    clipboard: Clipboard,
    selection: Selection,
    registry: Arc<Registry>,
    codec: Arc<dyn Codec>,
}

impl EditSession {
    /// Create a session over an empty root sequence
    pub fn new(id: &str, sort: NodeSort, registry: Arc<Registry>, codec: Arc<dyn Codec>) -> Self {
        Self {
            id: id.to_string(),
            sort,
            root: Sequence::new(),
            version: 0,
            keys: KeyGenerator::new(id),
            clipboard: Clipboard::new(),
            selection: Selection::new(),
            registry,
            codec,
        }
    }

    /// Create a session over an existing configuration
    pub fn from_values(
        id: &str,
        sort: NodeSort,
        values: Vec<Value>,
        registry: Arc<Registry>,
        codec: Arc<dyn Codec>,
    ) -> CommonResult<Self> {
        let mut configs: Vec<Config> = Vec::with_capacity(values.len());
        for value in values {
            match value {
                Value::Object(config) => configs.push(config),
                _ => return Err(domus_automation::CodecError::NotAMapping.into()),
            }
        }

        let mut session = Self::new(id, sort, registry, codec);
        session.root = decompose_all(sort, configs, &mut session.keys);
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sort(&self) -> NodeSort {
        self.sort
    }

    pub fn root(&self) -> &Sequence {
        &self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Apply a mutation to the sequence at `path`
    ///
    /// An empty path targets the root sequence.
    pub fn apply(
        &mut self,
        path: &[PathSegment],
        mutation: Mutation,
    ) -> Result<MutationResult, EditorError> {
        let (target, sort) = resolve_sequence_mut(&mut self.root, self.sort, path)?;
        let mut ctx = MutationContext {
            sort,
            keys: &mut self.keys,
            clipboard: &mut self.clipboard,
            registry: self.registry.as_ref(),
        };
        let next = mutation.apply(target, &mut ctx)?;
        *target = next;

        self.version += 1;
        let cleared = matches!(
            self.selection.retain(&self.root),
            Some(SelectionEvent::CloseDetail)
        );
        tracing::debug!(
            "[EditSession] {} applied, version {}",
            mutation.name(),
            self.version
        );

        Ok(MutationResult {
            version: self.version,
            selection_cleared: cleared,
        })
    }

    /// Open a detail editor on the node with `key` in the sequence at
    /// `path`
    ///
    /// The editor works on a copy; hand its result back via `adopt`.
    pub fn open_editor(&self, path: &[PathSegment], key: &str) -> Result<NodeEditor, EditorError> {
        let (sequence, sort) = resolve_sequence(&self.root, self.sort, path)?;
        let node = sequence
            .iter()
            .find(|node| node.key == key)
            .ok_or_else(|| EditorError::UnknownNode {
                key: key.to_string(),
            })?;
        Ok(NodeEditor::new(
            sort,
            node.clone(),
            self.registry.clone(),
            self.codec.clone(),
        ))
    }

    /// Adopt a committed node back into the tree, matched by key
    pub fn adopt(&mut self, path: &[PathSegment], node: Node) -> Result<MutationResult, EditorError> {
        let (sequence, _sort) = resolve_sequence_mut(&mut self.root, self.sort, path)?;
        let target = sequence
            .iter_mut()
            .find(|candidate| candidate.key == node.key)
            .ok_or_else(|| EditorError::UnknownNode {
                key: node.key.clone(),
            })?;
        *target = node;

        self.version += 1;
        let cleared = matches!(
            self.selection.retain(&self.root),
            Some(SelectionEvent::CloseDetail)
        );
        Ok(MutationResult {
            version: self.version,
            selection_cleared: cleared,
        })
    }

    pub fn select(&mut self, key: &str) -> Option<SelectionEvent> {
        self.selection.select(&self.root, key)
    }

    pub fn clear_selection(&mut self) -> Option<SelectionEvent> {
        self.selection.clear()
    }

    /// Serialize the whole root sequence for persistence handoff
    pub fn serialize(&self) -> CommonResult<String> {
        let value = Value::Array(compose_all(&self.root));
        Ok(self.codec.serialize(&value)?)
    }
}

fn resolve_sequence<'a>(
    sequence: &'a Sequence,
    sort: NodeSort,
    path: &[PathSegment],
) -> Result<(&'a Sequence, NodeSort), EditorError> {
    match path.split_first() {
        None => Ok((sequence, sort)),
        Some((segment, rest)) => {
            let node = sequence
                .iter()
                .find(|node| node.key == segment.key)
                .ok_or_else(|| EditorError::UnknownNode {
                    key: segment.key.clone(),
                })?;
            let child = node
                .children
                .get(&segment.slot)
                .ok_or_else(|| EditorError::MissingBranch {
                    key: segment.key.clone(),
                    slot: segment.slot,
                })?;
            resolve_sequence(child, segment.slot.sort(), rest)
        }
    }
}

fn resolve_sequence_mut<'a>(
    sequence: &'a mut Sequence,
    sort: NodeSort,
    path: &[PathSegment],
) -> Result<(&'a mut Sequence, NodeSort), EditorError> {
    match path.split_first() {
        None => Ok((sequence, sort)),
        Some((segment, rest)) => {
            let node = sequence
                .iter_mut()
                .find(|node| node.key == segment.key)
                .ok_or_else(|| EditorError::UnknownNode {
                    key: segment.key.clone(),
                })?;
            let child = node
                .children
                .get_mut(&segment.slot)
                .ok_or_else(|| EditorError::MissingBranch {
                    key: segment.key.clone(),
                    slot: segment.slot,
                })?;
            resolve_sequence_mut(child, segment.slot.sort(), rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domus_automation::JsonCodec;
    use serde_json::json;

    fn config(value: Value) -> Config {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn session() -> EditSession {
        EditSession::new(
            "morning_lights",
            NodeSort::Action,
            Arc::new(Registry::new()),
            Arc::new(JsonCodec),
        )
    }

    #[test]
    fn test_session_starts_empty() {
        let session = session();
        assert!(session.root().is_empty());
        assert_eq!(session.version(), 0);
        assert_eq!(session.selection().selected(), None);
    }

    #[test]
    fn test_version_increments_per_mutation() {
        let mut session = session();
        session
            .apply(
                &[],
                Mutation::Insert {
                    config: config(json!({"delay": ""})),
                },
            )
            .unwrap();
        session
            .apply(
                &[],
                Mutation::Insert {
                    config: config(json!({"scene": "scene.movie"})),
                },
            )
            .unwrap();

        assert_eq!(session.version(), 2);
        assert_eq!(session.root().len(), 2);
    }

    #[test]
    fn test_apply_at_nested_path() {
        let mut session = session();
        session
            .apply(
                &[],
                Mutation::Insert {
                    config: config(json!({"if": [], "then": []})),
                },
            )
            .unwrap();
        let block_key = session.root()[0].key.clone();

        let path = [PathSegment::new(block_key.clone(), Slot::Conditions)];
        session
            .apply(
                &path,
                Mutation::Insert {
                    config: config(json!({"condition": "sun", "after": "sunset"})),
                },
            )
            .unwrap();

        assert_eq!(session.root()[0].children[&Slot::Conditions].len(), 1);
        assert_eq!(session.root()[0].children[&Slot::Then].len(), 0);
    }

    #[test]
    fn test_unknown_path_is_rejected() {
        let mut session = session();
        let path = [PathSegment::new("missing", Slot::Then)];

        let err = session
            .apply(
                &path,
                Mutation::Insert {
                    config: config(json!({"delay": ""})),
                },
            )
            .unwrap_err();
        assert!(matches!(err, EditorError::UnknownNode { .. }));
    }

    #[test]
    fn test_from_values_rejects_non_mappings() {
        let result = EditSession::from_values(
            "morning_lights",
            NodeSort::Action,
            vec![json!({"delay": ""}), json!("shorthand")],
            Arc::new(Registry::new()),
            Arc::new(JsonCodec),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_inlines_nested_sequences() {
        let mut session = EditSession::from_values(
            "morning_lights",
            NodeSort::Action,
            vec![json!({"repeat": {"count": 2, "sequence": [{"delay": "00:00:01"}]}})],
            Arc::new(Registry::new()),
            Arc::new(JsonCodec),
        )
        .unwrap();
        session
            .apply(
                &[],
                Mutation::Insert {
                    config: config(json!({"delay": ""})),
                },
            )
            .unwrap();

        let text = session.serialize().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!([
                {"repeat": {"count": 2, "sequence": [{"delay": "00:00:01"}]}},
                {"delay": ""}
            ])
        );
    }
}
