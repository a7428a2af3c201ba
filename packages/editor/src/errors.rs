//! Error types for the editing engine

use crate::node::NodeId;
use inkstone_dom::HostError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Node {0:?} is not a text node")]
    NotText(NodeId),

    #[error("Node {0:?} is not an element")]
    NotElement(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("New node and reference node are the same node: {0:?}")]
    SameNode(NodeId),

    #[error("Inserting {child:?} into {parent:?} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0:?} has no parent")]
    Detached(NodeId),

    #[error("Offset {offset} is out of range for {node:?} (length {length})")]
    OffsetOutOfRange {
        node: NodeId,
        offset: usize,
        length: usize,
    },

    #[error("Attribute {name} does not exist on {node:?}")]
    MissingAttribute { node: NodeId, name: String },

    #[error("Deep clone is not supported")]
    DeepCloneUnsupported,

    #[error("Node {node:?} is not a descendant of {ancestor:?}")]
    NotDescendant { node: NodeId, ancestor: NodeId },

    #[error("Invalid position ({container:?}, {offset})")]
    InvalidPosition { container: NodeId, offset: usize },

    #[error("Selection is empty")]
    EmptySelection,

    #[error("Command did not set an ending selection")]
    MissingEndingSelection,

    #[error("Ending selection is already set")]
    EndingSelectionAlreadySet,

    #[error("Editing context is finished")]
    ContextFinished,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl EditError {
    /// True for violated preconditions of a primitive, i.e. caller bugs
    /// rather than lifecycle or host failures.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EditError::NotText(_)
                | EditError::NotElement(_)
                | EditError::NotAChild { .. }
                | EditError::SameNode(_)
                | EditError::HierarchyRequest { .. }
                | EditError::Detached(_)
                | EditError::OffsetOutOfRange { .. }
                | EditError::MissingAttribute { .. }
                | EditError::DeepCloneUnsupported
                | EditError::NotDescendant { .. }
                | EditError::InvalidPosition { .. }
                | EditError::EmptySelection
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid editor configuration: {0}")]
    Json(#[from] serde_json::Error),
}
