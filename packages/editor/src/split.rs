//! Tree splitting.
//!
//! `split_node` cuts one element in two at a child boundary; `split_tree`
//! repeats that from a descendant up to a root, so the root keeps
//! everything left of the path and a shallow copy of the path holds the
//! rest. Both are built on the logged primitives, so they undo exactly.

use crate::context::EditingContext;
use crate::errors::EditError;
use crate::node::NodeId;

impl<'h> EditingContext<'h> {
    /// Moves `reference` and its following siblings into a shallow clone of
    /// `parent`, inserted right after `parent`. Returns the clone.
    pub fn split_node(&mut self, parent: NodeId, reference: NodeId) -> Result<NodeId, EditError> {
        self.ensure_active()?;
        if self.tree().parent(reference) != Some(parent) {
            return Err(EditError::NotAChild {
                parent,
                child: reference,
            });
        }
        let grandparent = self.tree().parent(parent).ok_or(EditError::Detached(parent))?;

        let clone = self.clone_node(parent, false)?;
        let mut child = Some(reference);
        while let Some(current) = child {
            child = self.tree().next_sibling(current);
            self.append_child(clone, current)?;
        }
        self.insert_after(grandparent, clone, parent)?;
        Ok(clone)
    }

    /// Splits every ancestor of `reference` up to and including `root`.
    /// Returns the copy of `root`, now the next sibling of `root`.
    pub fn split_tree(&mut self, root: NodeId, reference: NodeId) -> Result<NodeId, EditError> {
        self.ensure_active()?;
        if !self.tree().is_descendant_of(reference, root) {
            return Err(EditError::NotDescendant {
                node: reference,
                ancestor: root,
            });
        }
        if self.tree().parent(root).is_none() {
            return Err(EditError::Detached(root));
        }

        let mut child = reference;
        loop {
            let parent = self.tree().parent(child).ok_or(EditError::Detached(child))?;
            let clone = self.split_node(parent, child)?;
            if parent == root {
                return Ok(clone);
            }
            child = clone;
        }
    }

    /// Hoists the children of `element` in front of it, stopping at
    /// `stop_child`. The element is removed once it is empty.
    pub fn unwrap_element(
        &mut self,
        element: NodeId,
        stop_child: Option<NodeId>,
    ) -> Result<(), EditError> {
        self.ensure_active()?;
        let parent = self.tree().parent(element).ok_or(EditError::Detached(element))?;
        if let Some(stop_child) = stop_child {
            if self.tree().parent(stop_child) != Some(element) {
                return Err(EditError::NotAChild {
                    parent: element,
                    child: stop_child,
                });
            }
        }

        let mut child = self.tree().first_child(element);
        while let Some(current) = child {
            if Some(current) == stop_child {
                break;
            }
            child = self.tree().next_sibling(current);
            self.insert_before(parent, current, Some(element))?;
        }
        if self.tree().first_child(element).is_none() {
            self.remove_child(parent, element)?;
        }
        Ok(())
    }
}
