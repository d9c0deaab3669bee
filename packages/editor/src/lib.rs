//! # Domus Editor
//!
//! Core editing engine for automation configuration trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ automation: node model + schemas + codec    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session lifecycle + mutations       │
//! │  - Resolve nested sequences by path         │
//! │  - Apply mutations copy-on-write            │
//! │  - Sync form and text presentations         │
//! │  - Coordinate selection and clipboard       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: rendering, dialogs, persistence       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The keyed tree is source of truth**: text is a derived view
//! 2. **Whole-value notifications**: every change hands the host a new
//!    sequence value, never a partial diff
//! 3. **Identity over position**: UI state is keyed by minted node keys
//!    that survive reorders and value replacements
//! 4. **Local degradation**: a broken node drops to text mode with
//!    warnings; siblings and ancestors stay editable
//!
//! ## Usage
//!
//! ```rust,ignore
//! use domus_automation::{JsonCodec, NodeSort, Registry};
//! use domus_editor::{EditSession, Mutation};
//! use std::sync::Arc;
//!
//! let mut session = EditSession::new(
//!     "morning_lights",
//!     NodeSort::Action,
//!     Arc::new(Registry::new()),
//!     Arc::new(JsonCodec),
//! );
//!
//! // Append a step
//! let registry = Registry::new();
//! let config = registry
//!     .lookup(NodeSort::Action, "delay")
//!     .unwrap()
//!     .default_config();
//! session.apply(&[], Mutation::Insert { config })?;
//!
//! // Edit it in detail
//! let key = session.root()[0].key.clone();
//! let mut editor = session.open_editor(&[], &key)?;
//! editor.edit_form(patch);
//! let node = editor.commit().clone();
//! session.adopt(&[], node)?;
//! ```

mod clipboard;
mod composition;
mod errors;
mod mutations;
mod selection;
mod session;
mod sync;

pub use clipboard::Clipboard;
pub use composition::{
    add_branch, add_choose_option, compose, compose_all, compose_config, decompose, decompose_all,
    remove_choose_option,
};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationContext, MutationError};
pub use selection::{Selection, SelectionEvent};
pub use session::{EditSession, MutationResult, PathSegment};
pub use sync::{EditMode, NodeEditor, Warning};

// Re-export common types for convenience
pub use domus_automation::{Node, NodeSort, Sequence, Slot};
