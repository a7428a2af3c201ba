//! # Operations
//!
//! Undoable host mutations recorded by an editing context.
//!
//! ## Design Principles
//!
//! 1. **Self-contained**: each variant stores the prior state its undo needs
//! 2. **Host-addressed**: operations name host nodes, so a log outlives the
//!    shadow arena that produced it
//! 3. **Exact**: `redo(); undo()` restores the host state seen before `redo`,
//!    and `redo(); undo(); redo()` equals one `redo`
//!
//! ## Operation Semantics
//!
//! ### RemoveChild
//! - Stores the removed node's former next sibling
//! - Undo reinserts before it, or appends when there was none
//!
//! ### SetAttribute / RemoveAttribute
//! - A value is always a string; removal is its own operation
//! - Undo of SetAttribute removes the attribute when it did not exist before
//! - Undo of RemoveAttribute puts the attribute back at its old index
//!
//! ### SetStyle
//! - Stores the whole `style` attribute as it was, with its index, so undo
//!   restores the declaration order and formatting byte for byte
//!
//! ### SplitText
//! - Redo keeps the first `offset` characters in `text_node`, moves the rest
//!   into `new_node` and inserts it right after
//! - Undo appends the suffix back and detaches `new_node`

use inkstone_dom::{HostDocument, HostError, HostNodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operation {
    AppendChild {
        parent: HostNodeId,
        new_child: HostNodeId,
    },

    InsertBefore {
        parent: HostNodeId,
        new_child: HostNodeId,
        ref_child: HostNodeId,
    },

    RemoveChild {
        parent: HostNodeId,
        old_child: HostNodeId,
        ref_child: Option<HostNodeId>,
    },

    ReplaceChild {
        parent: HostNodeId,
        new_child: HostNodeId,
        old_child: HostNodeId,
    },

    SetAttribute {
        element: HostNodeId,
        name: String,
        new_value: String,
        old_value: Option<String>,
    },

    RemoveAttribute {
        element: HostNodeId,
        name: String,
        old_value: String,
        index: usize,
    },

    SetStyle {
        element: HostNodeId,
        property: String,
        new_value: Option<String>,
        old_value: Option<String>,
        /// Raw `style` attribute before the change and its index.
        old_attribute: Option<(usize, String)>,
    },

    SplitText {
        text_node: HostNodeId,
        new_node: HostNodeId,
        offset: usize,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AppendChild { .. } => "appendChild",
            Operation::InsertBefore { .. } => "insertBefore",
            Operation::RemoveChild { .. } => "removeChild",
            Operation::ReplaceChild { .. } => "replaceChild",
            Operation::SetAttribute { .. } => "setAttribute",
            Operation::RemoveAttribute { .. } => "removeAttribute",
            Operation::SetStyle { .. } => "setStyle",
            Operation::SplitText { .. } => "splitText",
        }
    }

    /// Apply the operation to the host.
    pub fn redo(&self, host: &mut dyn HostDocument) -> Result<(), HostError> {
        match self {
            Operation::AppendChild { parent, new_child } => host.append_child(*parent, *new_child),

            Operation::InsertBefore { parent, new_child, ref_child } => {
                host.insert_before(*parent, *new_child, Some(*ref_child))
            }

            Operation::RemoveChild { parent, old_child, .. } => {
                host.remove_child(*parent, *old_child)
            }

            Operation::ReplaceChild { parent, new_child, old_child } => {
                host.replace_child(*parent, *new_child, *old_child)
            }

            Operation::SetAttribute { element, name, new_value, .. } => {
                host.set_attribute(*element, name, new_value)
            }

            Operation::RemoveAttribute { element, name, .. } => {
                host.remove_attribute(*element, name)
            }

            Operation::SetStyle { element, property, new_value, .. } => {
                host.set_style(*element, property, new_value.as_deref())
            }

            Operation::SplitText { text_node, new_node, offset } => {
                Self::redo_split_text(host, *text_node, *new_node, *offset)
            }
        }
    }

    /// Revert the operation on the host.
    pub fn undo(&self, host: &mut dyn HostDocument) -> Result<(), HostError> {
        match self {
            Operation::AppendChild { parent, new_child }
            | Operation::InsertBefore { parent, new_child, .. } => {
                host.remove_child(*parent, *new_child)
            }

            Operation::RemoveChild { parent, old_child, ref_child } => {
                host.insert_before(*parent, *old_child, *ref_child)
            }

            Operation::ReplaceChild { parent, new_child, old_child } => {
                host.replace_child(*parent, *old_child, *new_child)
            }

            Operation::SetAttribute { element, name, old_value, .. } => match old_value {
                Some(old_value) => host.set_attribute(*element, name, old_value),
                None => host.remove_attribute(*element, name),
            },

            Operation::RemoveAttribute { element, name, old_value, index } => {
                host.insert_attribute(*element, *index, name, old_value)
            }

            Operation::SetStyle { element, old_attribute, .. } => match old_attribute {
                Some((index, value)) => host.insert_attribute(*element, *index, "style", value),
                None if host.attribute(*element, "style").is_some() => {
                    host.remove_attribute(*element, "style")
                }
                None => Ok(()),
            },

            Operation::SplitText { text_node, new_node, .. } => {
                Self::undo_split_text(host, *text_node, *new_node)
            }
        }
    }

    fn redo_split_text(
        host: &mut dyn HostDocument,
        text_node: HostNodeId,
        new_node: HostNodeId,
        offset: usize,
    ) -> Result<(), HostError> {
        let text = host.text(text_node).ok_or(HostError::NotText(text_node))?;
        let parent = host
            .parent_node(text_node)
            .ok_or(HostError::Detached(text_node))?;
        let prefix: String = text.chars().take(offset).collect();
        let suffix: String = text.chars().skip(offset).collect();

        host.set_text(text_node, &prefix)?;
        host.set_text(new_node, &suffix)?;
        let next = host.next_sibling(text_node);
        host.insert_before(parent, new_node, next)
    }

    fn undo_split_text(
        host: &mut dyn HostDocument,
        text_node: HostNodeId,
        new_node: HostNodeId,
    ) -> Result<(), HostError> {
        let prefix = host.text(text_node).ok_or(HostError::NotText(text_node))?;
        let suffix = host.text(new_node).ok_or(HostError::NotText(new_node))?;

        host.set_text(text_node, &format!("{prefix}{suffix}"))?;
        if let Some(parent) = host.parent_node(new_node) {
            host.remove_child(parent, new_node)?;
        }
        Ok(())
    }
}
