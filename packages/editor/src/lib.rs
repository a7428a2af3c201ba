//! # Inkstone Editor
//!
//! Structural editing engine for rich-text documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: HostDocument (inkstone-dom)           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ context: one command execution              │
//! │  - shadow node arena of the editable root   │
//! │  - normalized selection                     │
//! │  - mutation primitives + operation log      │
//! │  - split_text / split_node / split_tree     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: registry, undo/redo of records      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Three views stay in step**: host tree, shadow tree and selection
//!    change together inside each primitive
//! 2. **Exact reversibility**: every host change is an [`Operation`] with a
//!    precise inverse
//! 3. **Errors, not panics**: a violated precondition is an [`EditError`];
//!    "nothing to do" is `Ok(false)`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkstone_dom::fixture;
//! use inkstone_editor::{CommandRegistry, Editor};
//!
//! let mut doc = fixture::parse("<p contenteditable>ab|cd</p>")?;
//! let mut registry = CommandRegistry::new();
//! registry.register("insertLink", insert_link);
//!
//! let mut editor = Editor::new(registry);
//! editor.exec_command(&mut doc, "insertLink", false, "https://example.com")?;
//! editor.undo(&mut doc)?;
//! ```

mod config;
mod context;
mod editing_selection;
mod editor;
mod errors;
mod node;
mod operations;
mod registry;
mod selection;
mod selection_tracker;
mod split;
mod undo_stack;

pub use config::EditorConfig;
pub use context::EditingContext;
pub use editing_selection::EditingSelection;
pub use editor::Editor;
pub use errors::{ConfigError, EditError};
pub use node::{Children, EditingNode, NodeArena, NodeId};
pub use operations::Operation;
pub use registry::{canonical_name, CommandFn, CommandRegistry};
pub use selection::{Position, ReadOnlySelection, SelectionDirection};
pub use selection_tracker::{SelectionTracker, TrackablePosition};
pub use undo_stack::{CommandRecord, UndoStack};

// Re-export host types for convenience
pub use inkstone_dom::{HostDocument, HostError, HostNodeId, HostSelection};
