//! # Sequence Mutations
//!
//! Structural operations on one ordered sequence of sibling nodes.
//!
//! ## Design Principles
//!
//! 1. **Copy-on-write**: every operation returns a new sequence; the
//!    input is never mutated
//! 2. **Identity-preserving**: reorders keep each node's key; only
//!    duplicate/paste mint fresh ones
//! 3. **Total over well-formed input**: callers gate first/last
//!    boundaries; an out-of-range index is a contract violation
//!
//! ## Mutation Semantics
//!
//! ### MoveUp / MoveDown
//! - Swap with the adjacent sibling
//! - No-op at the respective boundary
//!
//! ### Duplicate / Paste
//! - Deep clone of the value, fresh keys for the node and all
//!   descendants
//!
//! ### Cut / Copy
//! - Store a deep copy of the composed value in the clipboard slot for
//!   the sequence's sort; cut then deletes
//!
//! ### Delete
//! - Unconditional; user confirmation is the caller's responsibility

use crate::clipboard::Clipboard;
use crate::composition::{compose_config, decompose};
use domus_automation::{Config, KeyGenerator, NodeSort, Registry, Sequence};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural operations over a node sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Append a new node built from a raw value
    Insert { config: Config },

    /// Remove the node at index
    Delete { index: usize },

    /// Swap with the previous sibling
    MoveUp { index: usize },

    /// Swap with the next sibling
    MoveDown { index: usize },

    /// Deep-clone the node at index and append the clone
    Duplicate { index: usize },

    /// Store a deep copy in the clipboard, then delete
    Cut { index: usize },

    /// Store a deep copy in the clipboard; sequence unchanged
    Copy { index: usize },

    /// Append a deep re-clone of the clipboard entry
    Paste,

    /// Flip the enabled flag
    ToggleEnabled { index: usize },

    /// Set or clear (empty string) the alias
    Rename { index: usize, alias: String },

    /// Replace the node's value wholesale
    Replace {
        index: usize,
        config: Config,
        preserve_key: bool,
    },

    /// Replace the node with the default configuration of another type
    ChangeType { index: usize, type_key: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Clipboard holds no {sort:?} entry")]
    EmptyClipboard { sort: NodeSort },

    #[error("Unknown node type: {0}")]
    UnknownType(String),
}

/// State a mutation operates against, owned by the edit session
pub struct MutationContext<'a> {
    pub sort: NodeSort,
    pub keys: &'a mut KeyGenerator,
    pub clipboard: &'a mut Clipboard,
    pub registry: &'a Registry,
}

impl Mutation {
    /// Apply to a sequence, producing a new sequence
    pub fn apply(
        &self,
        sequence: &Sequence,
        ctx: &mut MutationContext,
    ) -> Result<Sequence, MutationError> {
        tracing::debug!("[Mutation] {} on {:?} sequence", self.name(), ctx.sort);

        let mut next = sequence.clone();
        match self {
            Mutation::Insert { config } => {
                next.push(decompose(ctx.sort, config.clone(), ctx.keys));
            }

            Mutation::Delete { index } => {
                check_index(*index, next.len())?;
                next.remove(*index);
            }

            Mutation::MoveUp { index } => {
                check_index(*index, next.len())?;
                if *index > 0 {
                    next.swap(*index - 1, *index);
                }
            }

            Mutation::MoveDown { index } => {
                check_index(*index, next.len())?;
                if *index + 1 < next.len() {
                    next.swap(*index, *index + 1);
                }
            }

            Mutation::Duplicate { index } => {
                check_index(*index, next.len())?;
                let value = compose_config(&next[*index]);
                next.push(decompose(ctx.sort, value, ctx.keys));
            }

            Mutation::Cut { index } => {
                check_index(*index, next.len())?;
                let node = next.remove(*index);
                ctx.clipboard.store(ctx.sort, compose_config(&node));
            }

            Mutation::Copy { index } => {
                check_index(*index, next.len())?;
                ctx.clipboard.store(ctx.sort, compose_config(&next[*index]));
            }

            Mutation::Paste => {
                let config = ctx
                    .clipboard
                    .peek(ctx.sort)
                    .ok_or(MutationError::EmptyClipboard { sort: ctx.sort })?;
                next.push(decompose(ctx.sort, config, ctx.keys));
            }

            Mutation::ToggleEnabled { index } => {
                check_index(*index, next.len())?;
                let node = &mut next[*index];
                let enabled = node.enabled();
                node.set_enabled(!enabled);
            }

            Mutation::Rename { index, alias } => {
                check_index(*index, next.len())?;
                next[*index].set_alias(Some(alias.as_str()));
            }

            Mutation::Replace {
                index,
                config,
                preserve_key,
            } => {
                check_index(*index, next.len())?;
                let previous_key = next[*index].key.clone();
                let mut node = decompose(ctx.sort, config.clone(), ctx.keys);
                if *preserve_key {
                    node.key = previous_key;
                }
                next[*index] = node;
            }

            Mutation::ChangeType { index, type_key } => {
                check_index(*index, next.len())?;
                let descriptor = ctx
                    .registry
                    .lookup(ctx.sort, type_key)
                    .ok_or_else(|| MutationError::UnknownType(type_key.clone()))?;

                // The row keeps its identity while the value is replaced
                // by the new type's default configuration.
                let previous_key = next[*index].key.clone();
                let mut node = decompose(ctx.sort, descriptor.default_config(), ctx.keys);
                node.key = previous_key;
                next[*index] = node;
            }
        }

        Ok(next)
    }

    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Insert { .. } => "insert",
            Mutation::Delete { .. } => "delete",
            Mutation::MoveUp { .. } => "move_up",
            Mutation::MoveDown { .. } => "move_down",
            Mutation::Duplicate { .. } => "duplicate",
            Mutation::Cut { .. } => "cut",
            Mutation::Copy { .. } => "copy",
            Mutation::Paste => "paste",
            Mutation::ToggleEnabled { .. } => "toggle_enabled",
            Mutation::Rename { .. } => "rename",
            Mutation::Replace { .. } => "replace",
            Mutation::ChangeType { .. } => "change_type",
        }
    }
}

fn check_index(index: usize, len: usize) -> Result<(), MutationError> {
    if index >= len {
        Err(MutationError::IndexOutOfRange { index, len })
    } else {
        Ok(())
    }
}
