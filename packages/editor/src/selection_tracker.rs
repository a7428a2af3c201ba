//! # Selection Tracker
//!
//! Keeps the two endpoints of a selection meaningful while a command removes
//! and unwraps nodes. Each endpoint is stored relative to a node that is
//! expected to survive and is re-anchored before that node goes away.
//!
//! ## Positions
//!
//! - `Node(n)`: right before `n`
//! - `AfterNode(n)`: right after `n`
//! - `BeforeAllChildren(c)`: first position inside the empty container `c`
//! - `AfterAllChildren(c)`: last position inside `c`
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut tracker = SelectionTracker::new(&context)?;
//! tracker.unwrap_element(&mut context, link)?;
//! tracker.finish(&mut context)?;
//! ```

use crate::context::EditingContext;
use crate::errors::EditError;
use crate::node::{NodeArena, NodeId};
use crate::selection::{ReadOnlySelection, SelectionDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackablePosition {
    Node(NodeId),
    AfterNode(NodeId),
    BeforeAllChildren(NodeId),
    AfterAllChildren(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Start,
    End,
}

impl TrackablePosition {
    fn classify(
        tree: &NodeArena,
        container: NodeId,
        offset: usize,
        boundary: Boundary,
    ) -> Result<Self, EditError> {
        if !tree.is_element(container) {
            return Err(EditError::NotElement(container));
        }
        let count = tree.child_count(container);
        if offset > count {
            return Err(EditError::InvalidPosition { container, offset });
        }
        if count == 0 {
            return Ok(TrackablePosition::BeforeAllChildren(container));
        }
        if offset == count {
            return Ok(TrackablePosition::AfterAllChildren(container));
        }
        let child = |index| {
            tree.child_at(container, index)
                .ok_or(EditError::InvalidPosition { container, offset })
        };
        if boundary == Boundary::End && offset > 0 {
            return Ok(TrackablePosition::AfterNode(child(offset - 1)?));
        }
        Ok(TrackablePosition::Node(child(offset)?))
    }

    fn reference(self) -> NodeId {
        match self {
            TrackablePosition::Node(node)
            | TrackablePosition::AfterNode(node)
            | TrackablePosition::BeforeAllChildren(node)
            | TrackablePosition::AfterAllChildren(node) => node,
        }
    }

    /// Position to use once `removed` leaves the tree.
    fn will_remove_node(self, tree: &NodeArena, removed: NodeId) -> Self {
        if !tree.is_inclusive_descendant_of(self.reference(), removed) {
            return self;
        }
        let Some(parent) = tree.parent(removed) else {
            return self;
        };
        match tree.previous_sibling(removed) {
            Some(previous) => TrackablePosition::AfterNode(previous),
            None => TrackablePosition::BeforeAllChildren(parent),
        }
    }

    /// Position to use once the children of `element` move in front of it.
    fn will_unwrap_node(self, tree: &NodeArena, element: NodeId) -> Self {
        match self {
            TrackablePosition::Node(node) | TrackablePosition::BeforeAllChildren(node)
                if node == element =>
            {
                tree.first_child(element)
                    .map(TrackablePosition::Node)
                    .unwrap_or(self)
            }
            TrackablePosition::AfterNode(node) | TrackablePosition::AfterAllChildren(node)
                if node == element =>
            {
                tree.last_child(element)
                    .map(TrackablePosition::AfterNode)
                    .unwrap_or(self)
            }
            _ => self,
        }
    }

    /// Boundary point this position denotes in the current tree.
    pub fn to_node_and_offset(self, tree: &NodeArena) -> Result<(NodeId, usize), EditError> {
        match self {
            TrackablePosition::Node(node) => {
                let parent = tree.parent(node).ok_or(EditError::Detached(node))?;
                Ok((parent, tree.node_index(node)))
            }
            TrackablePosition::AfterNode(node) => {
                let parent = tree.parent(node).ok_or(EditError::Detached(node))?;
                Ok((parent, tree.node_index(node) + 1))
            }
            TrackablePosition::BeforeAllChildren(container) => Ok((container, 0)),
            TrackablePosition::AfterAllChildren(container) => {
                Ok((container, tree.child_count(container)))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionTracker {
    start: TrackablePosition,
    end: TrackablePosition,
    direction: SelectionDirection,
}

impl SelectionTracker {
    /// Tracks the context's current (normalized) selection.
    pub fn new(context: &EditingContext<'_>) -> Result<Self, EditError> {
        Self::from_selection(context.tree(), &context.selection().to_read_only())
    }

    pub fn from_selection(tree: &NodeArena, selection: &ReadOnlySelection) -> Result<Self, EditError> {
        let (Some(start), Some(end)) = (selection.start_container(), selection.end_container()) else {
            return Err(EditError::EmptySelection);
        };
        Ok(Self {
            start: TrackablePosition::classify(tree, start, selection.start_offset(), Boundary::Start)?,
            end: TrackablePosition::classify(tree, end, selection.end_offset(), Boundary::End)?,
            direction: selection.direction(),
        })
    }

    /// Tracks explicit positions, e.g. after a command split the tree at
    /// the selection boundaries.
    pub fn with_positions(
        start: TrackablePosition,
        end: TrackablePosition,
        direction: SelectionDirection,
    ) -> Self {
        Self { start, end, direction }
    }

    pub fn start(&self) -> TrackablePosition {
        self.start
    }

    pub fn end(&self) -> TrackablePosition {
        self.end
    }

    /// Call before removing `node` from the tree.
    pub fn will_remove_node(&mut self, tree: &NodeArena, node: NodeId) {
        self.start = self.start.will_remove_node(tree, node);
        self.end = self.end.will_remove_node(tree, node);
    }

    /// Call before hoisting the children of `element` out of it.
    pub fn will_unwrap_node(&mut self, tree: &NodeArena, element: NodeId) {
        self.start = self.start.will_unwrap_node(tree, element);
        self.end = self.end.will_unwrap_node(tree, element);
    }

    /// Removes `node` from its parent, keeping the tracked endpoints valid.
    pub fn remove_node(&mut self, context: &mut EditingContext<'_>, node: NodeId) -> Result<(), EditError> {
        let parent = context.tree().parent(node).ok_or(EditError::Detached(node))?;
        self.will_remove_node(context.tree(), node);
        context.remove_child(parent, node)
    }

    /// Unwraps `element` entirely, keeping the tracked endpoints valid.
    pub fn unwrap_element(&mut self, context: &mut EditingContext<'_>, element: NodeId) -> Result<(), EditError> {
        if context.tree().first_child(element).is_none() {
            return self.remove_node(context, element);
        }
        self.will_unwrap_node(context.tree(), element);
        context.unwrap_element(element, None)
    }

    /// Current endpoints as a selection in the tracked direction.
    pub fn selection(&self, tree: &NodeArena) -> Result<ReadOnlySelection, EditError> {
        let (start_node, start_offset) = self.start.to_node_and_offset(tree)?;
        let (end_node, end_offset) = self.end.to_node_and_offset(tree)?;
        Ok(match self.direction {
            SelectionDirection::AnchorIsStart => ReadOnlySelection::new(
                start_node,
                start_offset,
                end_node,
                end_offset,
                self.direction,
            ),
            SelectionDirection::FocusIsStart => ReadOnlySelection::new(
                end_node,
                end_offset,
                start_node,
                start_offset,
                self.direction,
            ),
        })
    }

    /// Sets the tracked selection as the context's ending selection.
    pub fn finish(self, context: &mut EditingContext<'_>) -> Result<(), EditError> {
        let selection = self.selection(context.tree())?;
        context.set_ending_selection(selection)
    }
}
