//! # Dual-Representation Sync
//!
//! One node value, two presentations: a structured form and raw text.
//!
//! ```text
//!          ┌─────────────────────────────────────────┐
//!          │ Form Mode                               │
//!          │  - variant has a form editor            │
//!          │  - last validation passed               │
//!          │  - edits merge fields into the value    │
//!          └─────────────────────────────────────────┘
//!        toggle ↓↑ parse + validate gate
//!          ┌─────────────────────────────────────────┐
//!          │ Text Mode                               │
//!          │  - fallback for unsupported / invalid   │
//!          │  - edits replace the value wholesale    │
//!          │  - unparsable text retained as pending  │
//!          └─────────────────────────────────────────┘
//! ```
//!
//! The text representation is recomputed lazily: a form edit only
//! invalidates the cache, and serialization happens when text is next
//! requested.

use crate::composition::{compose, decompose};
use crate::errors::EditorError;
use domus_automation::{
    ActionKind, Codec, Config, ConditionKind, Failure, KeyGenerator, Node, NodeKind, NodeSort,
    Registry, Schema, Field, validate, CodecError,
};
use serde_json::Value;
use std::sync::Arc;

/// Presentation of a node's editable value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Form,
    Text,
}

/// Why a node is held in text mode
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// No editor support exists for this shape - distinct from a value
    /// that merely fails its schema
    UnsupportedType { type_key: Option<String> },

    /// The value does not conform to its variant's schema
    Invalid(Failure),
}

/// Editing state machine for a single node
pub struct NodeEditor {
    sort: NodeSort,
    node: Node,
    mode: EditMode,
    pending_text: Option<String>,
    cached_text: Option<String>,
    warnings: Vec<Warning>,
    schema: Option<Schema>,
    has_form: bool,
    keys: KeyGenerator,
    registry: Arc<Registry>,
    codec: Arc<dyn Codec>,
}

impl NodeEditor {
    pub fn new(sort: NodeSort, node: Node, registry: Arc<Registry>, codec: Arc<dyn Codec>) -> Self {
        let keys = KeyGenerator::from_seed(node.key.clone());
        let mut editor = Self {
            sort,
            node,
            mode: EditMode::Text,
            pending_text: None,
            cached_text: None,
            warnings: Vec::new(),
            schema: None,
            has_form: false,
            keys,
            registry,
            codec,
        };
        editor.resolve();
        editor.refresh();
        if editor.has_form && editor.warnings.is_empty() {
            editor.mode = EditMode::Form;
        }
        editor
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn key(&self) -> &str {
        &self.node.key
    }

    /// Warnings explaining why the node is stuck in text mode
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_form_editor(&self) -> bool {
        self.has_form
    }

    /// Whether unparsed text is pending
    pub fn has_pending_text(&self) -> bool {
        self.pending_text.is_some()
    }

    /// The text representation, computed on demand
    pub fn text(&mut self) -> Result<&str, EditorError> {
        if self.pending_text.is_some() {
            return Ok(self.pending_text.as_deref().unwrap());
        }
        if self.cached_text.is_none() {
            let value = compose(&self.node);
            self.cached_text = Some(self.codec.serialize(&value)?);
        }
        Ok(self.cached_text.as_deref().unwrap())
    }

    /// Merge changed fields into the structured value
    ///
    /// No validation gate here - that happens on commit and on mode
    /// transitions. A null value removes the field.
    pub fn edit_form(&mut self, patch: Config) {
        for (field, value) in patch {
            if value.is_null() {
                self.node.config.remove(&field);
            } else {
                self.node.config.insert(field, value);
            }
        }
        self.cached_text = None;
    }

    /// Replace the value from edited raw text
    ///
    /// On parse failure the structured value is left untouched and the
    /// text is retained as pending, so nothing is lost on toggle.
    pub fn edit_text(&mut self, text: &str) -> Result<(), EditorError> {
        match self.adopt_text(text) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.pending_text = Some(text.to_string());
                Err(err)
            }
        }
    }

    /// Re-validate and finish an editing round
    ///
    /// A validation failure observed in form mode should not normally
    /// occur, but device-linked values can reference since-deleted
    /// entities; the node then drops to text mode with warnings.
    pub fn commit(&mut self) -> &Node {
        self.refresh();
        if self.mode == EditMode::Form && !self.warnings.is_empty() {
            tracing::warn!(
                "[NodeEditor] {} failed validation after form edit, dropping to text mode",
                self.node.key
            );
            self.mode = EditMode::Text;
        }
        &self.node
    }

    /// Switch to text mode; always permitted
    pub fn to_text(&mut self) -> &[Warning] {
        self.mode = EditMode::Text;
        &self.warnings
    }

    /// Switch to form mode
    ///
    /// Blocked if pending text fails to parse, if the value fails
    /// validation, or if the variant has no form editor; the caller is
    /// signaled, never silently ignored.
    pub fn to_form(&mut self) -> Result<(), EditorError> {
        if let Some(pending) = self.pending_text.clone() {
            self.adopt_text(&pending)?;
        }

        if !self.has_form {
            return Err(EditorError::NoFormEditor);
        }

        self.refresh();
        let failures: Vec<Failure> = self
            .warnings
            .iter()
            .filter_map(|warning| match warning {
                Warning::Invalid(failure) => Some(failure.clone()),
                Warning::UnsupportedType { .. } => None,
            })
            .collect();
        if !failures.is_empty() {
            return Err(EditorError::InvalidValue { failures });
        }

        self.mode = EditMode::Form;
        Ok(())
    }

    /// Merge capability-fetched fields into this instance's schema
    ///
    /// A failed capability fetch is represented by never calling this;
    /// the node simply renders without the extra fields.
    pub fn extend_schema(&mut self, extra: Vec<Field>) {
        if let Some(schema) = &mut self.schema {
            schema.extend(extra);
            self.refresh();
            if self.mode == EditMode::Form && !self.warnings.is_empty() {
                self.mode = EditMode::Text;
            }
        }
    }

    fn adopt_text(&mut self, text: &str) -> Result<(), EditorError> {
        let value = self.codec.parse(text)?;
        let Value::Object(config) = value else {
            return Err(EditorError::Codec(CodecError::NotAMapping));
        };

        let mut node = decompose(self.sort, config, &mut self.keys);
        // Keep the identity key so UI state survives the replacement
        node.key = self.node.key.clone();
        self.node = node;
        self.pending_text = None;
        self.cached_text = Some(text.to_string());
        self.resolve();
        self.refresh();
        Ok(())
    }

    /// Resolve schema and form capability for the current value
    fn resolve(&mut self) {
        let descriptor = match self.node.kind {
            // A condition step is validated against the schema of the
            // condition it actually holds
            Some(NodeKind::Action(ActionKind::CheckCondition)) => ConditionKind::of(&self.node.config)
                .and_then(|condition| {
                    self.registry
                        .lookup(NodeSort::Condition, condition.type_key())
                }),
            Some(kind) => self.registry.lookup_kind(kind),
            None => None,
        };

        match descriptor {
            Some(descriptor) => {
                self.schema = Some(descriptor.schema().clone());
                self.has_form = descriptor.has_form_editor();
            }
            None => {
                self.schema = None;
                self.has_form = false;
            }
        }
    }

    fn refresh(&mut self) {
        self.warnings.clear();
        match &self.schema {
            None => {
                self.warnings.push(Warning::UnsupportedType {
                    type_key: self.node.type_key().map(str::to_string),
                });
            }
            Some(schema) => {
                let value = compose(&self.node);
                for failure in validate(&value, schema).failures() {
                    self.warnings.push(Warning::Invalid(failure.clone()));
                }
            }
        }
    }
}
