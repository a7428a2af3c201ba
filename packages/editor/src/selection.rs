//! Positions and immutable selections.

use crate::errors::EditError;
use crate::node::{NodeArena, NodeId};
use inkstone_dom::{HostNodeId, HostSelection};
use serde::{Deserialize, Serialize};

/// A boundary point: `offset` counts children of an element or characters
/// of a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    container: NodeId,
    offset: usize,
}

impl Position {
    pub fn new(tree: &NodeArena, container: NodeId, offset: usize) -> Result<Self, EditError> {
        if offset > tree.max_offset(container) {
            return Err(EditError::InvalidPosition { container, offset });
        }
        Ok(Self { container, offset })
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Child right after the boundary, if the container is an element.
    pub fn node_after(&self, tree: &NodeArena) -> Option<NodeId> {
        tree.child_at(self.container, self.offset)
    }

    /// Child right before the boundary.
    pub fn node_before(&self, tree: &NodeArena) -> Option<NodeId> {
        self.offset
            .checked_sub(1)
            .and_then(|index| tree.child_at(self.container, index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionDirection {
    AnchorIsStart,
    FocusIsStart,
}

/// Immutable selection value.
///
/// The node handle is generic so the same type describes shadow selections
/// (`NodeId`, inside a command) and host selections (`HostNodeId`, in the
/// undo history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOnlySelection<N = NodeId> {
    anchor: Option<(N, usize)>,
    focus: Option<(N, usize)>,
    direction: SelectionDirection,
}

impl<N: Copy + PartialEq> ReadOnlySelection<N> {
    pub fn new(
        anchor_node: N,
        anchor_offset: usize,
        focus_node: N,
        focus_offset: usize,
        direction: SelectionDirection,
    ) -> Self {
        Self {
            anchor: Some((anchor_node, anchor_offset)),
            focus: Some((focus_node, focus_offset)),
            direction,
        }
    }

    pub fn caret(node: N, offset: usize) -> Self {
        Self::new(node, offset, node, offset, SelectionDirection::AnchorIsStart)
    }

    pub fn empty() -> Self {
        Self {
            anchor: None,
            focus: None,
            direction: SelectionDirection::AnchorIsStart,
        }
    }

    pub fn anchor_node(&self) -> Option<N> {
        self.anchor.map(|(node, _)| node)
    }

    pub fn anchor_offset(&self) -> usize {
        self.anchor.map(|(_, offset)| offset).unwrap_or(0)
    }

    pub fn focus_node(&self) -> Option<N> {
        self.focus.map(|(node, _)| node)
    }

    pub fn focus_offset(&self) -> usize {
        self.focus.map(|(_, offset)| offset).unwrap_or(0)
    }

    pub fn direction(&self) -> SelectionDirection {
        self.direction
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn is_caret(&self) -> bool {
        self.anchor.is_some() && self.anchor == self.focus
    }

    pub fn is_range(&self) -> bool {
        !self.is_empty() && !self.is_caret()
    }

    fn start(&self) -> Option<(N, usize)> {
        match self.direction {
            SelectionDirection::AnchorIsStart => self.anchor,
            SelectionDirection::FocusIsStart => self.focus,
        }
    }

    fn end(&self) -> Option<(N, usize)> {
        match self.direction {
            SelectionDirection::AnchorIsStart => self.focus,
            SelectionDirection::FocusIsStart => self.anchor,
        }
    }

    pub fn start_container(&self) -> Option<N> {
        self.start().map(|(node, _)| node)
    }

    pub fn start_offset(&self) -> usize {
        self.start().map(|(_, offset)| offset).unwrap_or(0)
    }

    pub fn end_container(&self) -> Option<N> {
        self.end().map(|(node, _)| node)
    }

    pub fn end_offset(&self) -> usize {
        self.end().map(|(_, offset)| offset).unwrap_or(0)
    }

    /// Same selection expressed through another node handle.
    pub fn map_nodes<M: Copy + PartialEq>(&self, mut map: impl FnMut(N) -> M) -> ReadOnlySelection<M> {
        ReadOnlySelection {
            anchor: self.anchor.map(|(node, offset)| (map(node), offset)),
            focus: self.focus.map(|(node, offset)| (map(node), offset)),
            direction: self.direction,
        }
    }
}

impl ReadOnlySelection<HostNodeId> {
    pub fn from_host(selection: &HostSelection, direction: SelectionDirection) -> Self {
        Self::new(
            selection.anchor_node,
            selection.anchor_offset,
            selection.focus_node,
            selection.focus_offset,
            direction,
        )
    }

    /// Live host selection for this value; `None` when empty.
    pub fn to_host(&self) -> Option<HostSelection> {
        let (anchor_node, anchor_offset) = self.anchor?;
        let (focus_node, focus_offset) = self.focus?;
        Some(HostSelection {
            anchor_node,
            anchor_offset,
            focus_node,
            focus_offset,
        })
    }
}

impl<N: Copy + PartialEq> Default for ReadOnlySelection<N> {
    fn default() -> Self {
        Self::empty()
    }
}
