//! Host adapter contract.
//!
//! Node handles are opaque [`HostNodeId`]s. Every mutation reports failure
//! through [`HostError`] instead of panicking so callers can surface
//! adapter misuse as a regular error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identity of a node inside a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostNodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Element,
    Text,
}

/// Live selection as exposed by the host.
///
/// The host does not know about direction; the editing layer derives it
/// from document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSelection {
    pub anchor_node: HostNodeId,
    pub anchor_offset: usize,
    pub focus_node: HostNodeId,
    pub focus_offset: usize,
}

impl HostSelection {
    pub fn caret(node: HostNodeId, offset: usize) -> Self {
        Self {
            anchor_node: node,
            anchor_offset: offset,
            focus_node: node,
            focus_offset: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_node == self.focus_node && self.anchor_offset == self.focus_offset
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Unknown host node: {0:?}")]
    UnknownNode(HostNodeId),

    #[error("Host node {0:?} is not an element")]
    NotAnElement(HostNodeId),

    #[error("Host node {0:?} is not text")]
    NotText(HostNodeId),

    #[error("Host node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: HostNodeId, child: HostNodeId },

    #[error("Host node {0:?} has no parent")]
    Detached(HostNodeId),

    #[error("Inserting {child:?} into {parent:?} would create a cycle")]
    Cycle { parent: HostNodeId, child: HostNodeId },

    #[error("Attribute {name} does not exist on {node:?}")]
    MissingAttribute { node: HostNodeId, name: String },
}

/// Minimal tree + selection surface the editing engine relies on.
///
/// Insertion methods follow DOM semantics: a child that is still attached
/// somewhere else is detached first.
pub trait HostDocument {
    fn create_element(&mut self, tag: &str) -> HostNodeId;

    fn create_text_node(&mut self, text: &str) -> HostNodeId;

    fn node_kind(&self, node: HostNodeId) -> Result<NodeKind, HostError>;

    /// Uppercase tag name for elements, `#text` for text nodes.
    fn node_name(&self, node: HostNodeId) -> Result<String, HostError>;

    fn parent_node(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn first_child(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId>;

    /// Attributes in document order, names lowercased.
    fn attributes(&self, node: HostNodeId) -> Vec<(String, String)>;

    /// Character data of a text node, `None` for elements.
    fn text(&self, node: HostNodeId) -> Option<String>;

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError>;

    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError>;

    /// Inserts `child` before `reference`; `None` appends.
    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        reference: Option<HostNodeId>,
    ) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError>;

    fn replace_child(
        &mut self,
        parent: HostNodeId,
        new_child: HostNodeId,
        old_child: HostNodeId,
    ) -> Result<(), HostError>;

    fn set_attribute(&mut self, element: HostNodeId, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_attribute(&mut self, element: HostNodeId, name: &str) -> Result<(), HostError>;

    /// Places `name` at position `index` of the attribute list (clamped to
    /// its length), dropping an existing attribute of that name first.
    fn insert_attribute(
        &mut self,
        element: HostNodeId,
        index: usize,
        name: &str,
        value: &str,
    ) -> Result<(), HostError>;

    /// Inline style property value, `None` when the property is not set.
    fn style(&self, element: HostNodeId, property: &str) -> Option<String>;

    /// Sets an inline style property; `None` removes it.
    fn set_style(
        &mut self,
        element: HostNodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), HostError>;

    fn selection(&self) -> Option<HostSelection>;

    fn set_selection(&mut self, selection: Option<HostSelection>);

    fn attribute(&self, node: HostNodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.attributes(node)
            .into_iter()
            .find(|(attr_name, _)| *attr_name == name)
            .map(|(_, value)| value)
    }

    fn child_nodes(&self, node: HostNodeId) -> Vec<HostNodeId> {
        let mut children = Vec::new();
        let mut child = self.first_child(node);
        while let Some(current) = child {
            children.push(current);
            child = self.next_sibling(current);
        }
        children
    }

    fn is_text(&self, node: HostNodeId) -> bool {
        matches!(self.node_kind(node), Ok(NodeKind::Text))
    }
}
