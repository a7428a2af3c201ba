//! # Editing Selection
//!
//! Shadow copy of the live selection. Building it imports the editable
//! subtree around the selection and splits boundary text nodes so both
//! endpoints end up between nodes, expressed as (element, child index).
//!
//! ## Steps
//!
//! 1. Common ancestor of anchor and focus in the host
//! 2. Editing root: the outermost node of the contiguous editable run above
//!    the common ancestor; none means an empty selection
//! 3. Import the root's subtree into the arena
//! 4. Direction from document order of the two boundary points
//! 5. Split text nodes at endpoints strictly inside them
//! 6. Re-express text endpoints relative to their parent
//! 7. Collect the nodes between the boundaries

use crate::context::EditingContext;
use crate::errors::EditError;
use crate::node::{NodeArena, NodeId};
use crate::selection::{Position, ReadOnlySelection, SelectionDirection};
use inkstone_dom::{HostDocument, HostError, HostNodeId, HostSelection};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EditingSelection {
    root: Option<NodeId>,
    anchor: Option<Position>,
    focus: Option<Position>,
    direction: SelectionDirection,
    nodes: Vec<NodeId>,
}

impl EditingSelection {
    pub(crate) fn empty() -> Self {
        Self {
            root: None,
            anchor: None,
            focus: None,
            direction: SelectionDirection::AnchorIsStart,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn build(
        context: &mut EditingContext<'_>,
        selection: &HostSelection,
    ) -> Result<Self, EditError> {
        let host = &*context.host;
        let Some(common) = host_common_ancestor(host, selection.anchor_node, selection.focus_node)
        else {
            return Ok(Self::empty());
        };
        let Some(root_host) = editing_root(host, common) else {
            debug!(?common, "Selection is outside editable content");
            return Ok(Self::empty());
        };

        let root = context.import_subtree(root_host)?;
        let anchor_node = context
            .shadow_of(selection.anchor_node)
            .ok_or(HostError::UnknownNode(selection.anchor_node))?;
        let focus_node = context
            .shadow_of(selection.focus_node)
            .ok_or(HostError::UnknownNode(selection.focus_node))?;
        let mut anchor = Position::new(context.tree(), anchor_node, selection.anchor_offset)?;
        let mut focus = Position::new(context.tree(), focus_node, selection.focus_offset)?;

        let direction = match context.tree().compare_points(
            (anchor.container(), anchor.offset()),
            (focus.container(), focus.offset()),
        ) {
            Ordering::Greater => SelectionDirection::FocusIsStart,
            _ => SelectionDirection::AnchorIsStart,
        };
        let anchor_is_start = direction == SelectionDirection::AnchorIsStart;

        // Split the anchor's text node first; the focus follows the split.
        if needs_split(context.tree(), anchor) {
            let text = anchor.container();
            let new_node = context.split_text(text, anchor.offset())?;
            focus = follow_split(context.tree(), focus, text, new_node, anchor.offset());
            if anchor_is_start {
                anchor = Position::new(context.tree(), new_node, 0)?;
            }
        }
        if needs_split(context.tree(), focus) {
            let text = focus.container();
            let new_node = context.split_text(text, focus.offset())?;
            anchor = follow_split(context.tree(), anchor, text, new_node, focus.offset());
            if !anchor_is_start {
                focus = Position::new(context.tree(), new_node, 0)?;
            }
        }

        let anchor = outside_text(context.tree(), anchor)?;
        let focus = outside_text(context.tree(), focus)?;
        debug!(
            anchor = ?(anchor.container(), anchor.offset()),
            focus = ?(focus.container(), focus.offset()),
            ?direction,
            "Normalized selection"
        );

        let (start, end) = if anchor_is_start {
            (anchor, focus)
        } else {
            (focus, anchor)
        };
        let nodes = context.tree().nodes_between(
            root,
            (start.container(), start.offset()),
            (end.container(), end.offset()),
        );
        Ok(Self {
            root: Some(root),
            anchor: Some(anchor),
            focus: Some(focus),
            direction,
            nodes,
        })
    }

    /// Root of the editable subtree the selection lives in.
    pub fn root_element(&self) -> Option<NodeId> {
        self.root
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    pub fn focus(&self) -> Option<Position> {
        self.focus
    }

    pub fn direction(&self) -> SelectionDirection {
        self.direction
    }

    /// Nodes in document order from the start boundary up to, not
    /// including, the node at the end boundary.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
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

    pub fn start_position(&self) -> Option<Position> {
        match self.direction {
            SelectionDirection::AnchorIsStart => self.anchor,
            SelectionDirection::FocusIsStart => self.focus,
        }
    }

    pub fn end_position(&self) -> Option<Position> {
        match self.direction {
            SelectionDirection::AnchorIsStart => self.focus,
            SelectionDirection::FocusIsStart => self.anchor,
        }
    }

    pub fn to_read_only(&self) -> ReadOnlySelection {
        match (self.anchor, self.focus) {
            (Some(anchor), Some(focus)) => ReadOnlySelection::new(
                anchor.container(),
                anchor.offset(),
                focus.container(),
                focus.offset(),
                self.direction,
            ),
            _ => ReadOnlySelection::empty(),
        }
    }
}

fn host_inclusive_ancestors(host: &dyn HostDocument, node: HostNodeId) -> Vec<HostNodeId> {
    std::iter::successors(Some(node), |current| host.parent_node(*current)).collect()
}

fn host_common_ancestor(host: &dyn HostDocument, a: HostNodeId, b: HostNodeId) -> Option<HostNodeId> {
    let ancestors = host_inclusive_ancestors(host, a);
    host_inclusive_ancestors(host, b)
        .into_iter()
        .find(|candidate| ancestors.contains(candidate))
}

fn host_is_content_editable(host: &dyn HostDocument, node: HostNodeId) -> bool {
    host_inclusive_ancestors(host, node)
        .into_iter()
        .find_map(|runner| host.attribute(runner, "contenteditable"))
        .map(|value| !value.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

fn editing_root(host: &dyn HostDocument, node: HostNodeId) -> Option<HostNodeId> {
    let mut root = None;
    for runner in host_inclusive_ancestors(host, node) {
        if host_is_content_editable(host, runner) {
            root = Some(runner);
        } else if root.is_some() {
            break;
        }
    }
    root
}

fn needs_split(tree: &NodeArena, position: Position) -> bool {
    let container = position.container();
    tree.is_text(container)
        && position.offset() > 0
        && position.offset() < tree.node(container).text_len()
}

/// Keeps `position` pointing at the same place after `text` was split at
/// `offset` and `new_node` inserted right after it.
fn follow_split(
    tree: &NodeArena,
    position: Position,
    text: NodeId,
    new_node: NodeId,
    offset: usize,
) -> Position {
    let container = position.container();
    if container == text && position.offset() > offset {
        return Position::new(tree, new_node, position.offset() - offset).unwrap_or(position);
    }
    if Some(container) == tree.parent(text) && position.offset() > tree.node_index(text) {
        return Position::new(tree, container, position.offset() + 1).unwrap_or(position);
    }
    position
}

/// Text endpoints sit at offset 0 or at the end once splitting is done.
fn outside_text(tree: &NodeArena, position: Position) -> Result<Position, EditError> {
    let container = position.container();
    if !tree.is_text(container) {
        return Ok(position);
    }
    let parent = tree.parent(container).ok_or(EditError::Detached(container))?;
    let index = tree.node_index(container);
    let offset = if position.offset() == 0 { index } else { index + 1 };
    Position::new(tree, parent, offset)
}
