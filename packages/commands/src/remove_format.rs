//! `removeFormat`
//!
//! Splits formatting ancestors at both selection boundaries so they can be
//! stripped from the selected part alone, then unwraps every formatting
//! element in the selection and clears the text styles of the rest.

use crate::content_model::is_removable_formatting;
use crate::{boundary_mark, has_content_before, keep_starting_selection, node_after_boundary};
use inkstone_editor::{
    EditError, EditingContext, HostDocument, NodeArena, NodeId, Position, SelectionTracker,
    TrackablePosition,
};
use tracing::debug;

const TEXT_STYLES: &[&str] = &[
    "background-color",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "text-decoration",
];

pub fn remove_format(
    context: &mut EditingContext<'_>,
    _user_interface: bool,
    _value: &str,
) -> Result<bool, EditError> {
    let selection = context.selection();
    let (Some(root), Some(start), Some(end)) = (
        selection.root_element(),
        selection.start_position(),
        selection.end_position(),
    ) else {
        return keep_starting_selection(context);
    };
    if !selection.is_range() {
        return keep_starting_selection(context);
    }
    let direction = selection.direction();

    // The end goes first; splitting there never moves the start.
    let mut end_mark = match formatting_top(context.tree(), end.container()) {
        Some(top) => split_at(context, end, top)?,
        None => boundary_mark(context.tree(), end.container(), end.offset()),
    };
    let start_mark = match formatting_top(context.tree(), start.container()) {
        Some(top) => {
            let mark = split_at(context, start, top)?;
            if let TrackablePosition::Node(clone) = mark {
                // Whatever followed the boundary inside `top` now lives in
                // the clone.
                if clone != top && end_mark == TrackablePosition::AfterNode(top) {
                    end_mark = TrackablePosition::AfterNode(clone);
                }
            }
            mark
        }
        None => boundary_mark(context.tree(), start.container(), start.offset()),
    };

    let tree = context.tree();
    let nodes = tree.nodes_between(
        root,
        start_mark.to_node_and_offset(tree)?,
        end_mark.to_node_and_offset(tree)?,
    );
    debug!(count = nodes.len(), "Removing formatting");

    let mut tracker = SelectionTracker::with_positions(start_mark, end_mark, direction);
    for node in nodes {
        let tree = context.tree();
        if !tree.is_element(node) || !tree.is_editable(node) {
            continue;
        }
        if is_removable_formatting(tree, node) {
            tracker.unwrap_element(context, node)?;
        } else {
            clear_text_styles(context, node)?;
        }
    }
    tracker.finish(context)?;
    Ok(true)
}

/// Outermost element of the unbroken chain of removable formatting
/// elements starting at `container`.
fn formatting_top(tree: &NodeArena, container: NodeId) -> Option<NodeId> {
    tree.inclusive_ancestors(container)
        .take_while(|runner| is_removable_formatting(tree, *runner))
        .last()
}

/// Splits `top` at `boundary` and returns the boundary as a mark that
/// survives the split.
fn split_at(
    context: &mut EditingContext<'_>,
    boundary: Position,
    top: NodeId,
) -> Result<TrackablePosition, EditError> {
    let tree = context.tree();
    match node_after_boundary(tree, boundary.container(), boundary.offset(), top) {
        Some(reference) if has_content_before(tree, reference, top) => {
            let clone = context.split_tree(top, reference)?;
            Ok(TrackablePosition::Node(clone))
        }
        Some(_) => Ok(TrackablePosition::Node(top)),
        None => Ok(TrackablePosition::AfterNode(top)),
    }
}

fn clear_text_styles(context: &mut EditingContext<'_>, element: NodeId) -> Result<(), EditError> {
    let host = context.tree().host(element);
    for property in TEXT_STYLES {
        if HostDocument::style(context.host(), host, property).is_some() {
            context.set_style(element, property, None)?;
        }
    }
    Ok(())
}
