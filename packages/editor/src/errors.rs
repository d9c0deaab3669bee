//! Error types for the editor

use domus_automation::{CodecError, Failure, Slot};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Value does not conform to its schema ({} failures)", .failures.len())]
    InvalidValue { failures: Vec<Failure> },

    #[error("No form editor exists for this node")]
    NoFormEditor,

    #[error("Unknown node: {key}")]
    UnknownNode { key: String },

    #[error("Node {key} has no {slot:?} branch")]
    MissingBranch { key: String, slot: Slot },
}
