//! `createLink`
//!
//! Caret: inserts `<a href=url>url</a>` at the caret. Inside a link the
//! enclosing interactive element is split first, and the formatting
//! elements around the caret are recreated around the new link.
//!
//! Range: wraps each run of selected, editable phrasing siblings in a new
//! `<a href=url>`, and retargets links the selection already touches.

use crate::content_model::{is_interactive, is_link, is_phrasing, is_whitespace_node};
use crate::{boundary_mark, has_content_before, keep_starting_selection, node_after_boundary};
use inkstone_editor::{
    EditError, EditingContext, NodeArena, NodeId, ReadOnlySelection, SelectionDirection,
    SelectionTracker,
};
use std::cmp::Ordering;
use tracing::debug;

pub fn create_link(
    context: &mut EditingContext<'_>,
    _user_interface: bool,
    url: &str,
) -> Result<bool, EditError> {
    if url.is_empty() || context.selection().is_empty() {
        return keep_starting_selection(context);
    }
    if context.selection().is_caret() {
        return link_at_caret(context, url);
    }
    link_range(context, url)
}

fn new_link(context: &mut EditingContext<'_>, url: &str) -> Result<NodeId, EditError> {
    let link = context.create_element("a");
    context.set_attribute(link, "href", url)?;
    Ok(link)
}

fn link_with_text(context: &mut EditingContext<'_>, url: &str) -> Result<NodeId, EditError> {
    let link = new_link(context, url)?;
    let text = context.create_text_node(url);
    context.append_child(link, text)?;
    Ok(link)
}

fn link_at_caret(context: &mut EditingContext<'_>, url: &str) -> Result<bool, EditError> {
    let Some(focus) = context.selection().focus() else {
        return keep_starting_selection(context);
    };
    let container = focus.container();
    if !context.tree().is_content_editable(container) {
        return keep_starting_selection(context);
    }

    let ancestors: Vec<NodeId> = context.tree().inclusive_ancestors(container).collect();
    let interactive = ancestors
        .iter()
        .rev()
        .copied()
        .find(|node| is_interactive(context.tree(), *node));

    let Some(interactive) = interactive else {
        let link = link_with_text(context, url)?;
        let reference = focus.node_after(context.tree());
        context.insert_before(container, link, reference)?;
        return select_link(context, link);
    };

    let tree = context.tree();
    let Some(editable) = tree
        .parent(interactive)
        .filter(|parent| tree.is_content_editable(*parent))
    else {
        debug!("No editable parent around the enclosing interactive element");
        return keep_starting_selection(context);
    };
    let reference = node_after_boundary(tree, container, focus.offset(), interactive);
    let split_at = reference.filter(|node| has_content_before(tree, *node, interactive));

    // Rebuild the non-interactive part of the path around the link.
    let link = link_with_text(context, url)?;
    let mut wrapped = link;
    for node in ancestors.iter().copied().take_while(|node| *node != editable) {
        if is_interactive(context.tree(), node) {
            continue;
        }
        let clone = context.clone_node(node, false)?;
        context.append_child(clone, wrapped)?;
        wrapped = clone;
    }

    match (reference, split_at) {
        (Some(_), Some(reference)) => {
            context.split_tree(interactive, reference)?;
            context.insert_after(editable, wrapped, interactive)?;
        }
        (Some(_), None) => context.insert_before(editable, wrapped, Some(interactive))?,
        (None, _) => context.insert_after(editable, wrapped, interactive)?,
    }
    select_link(context, link)
}

/// Selects `link` as a whole, anchor first.
fn select_link(context: &mut EditingContext<'_>, link: NodeId) -> Result<bool, EditError> {
    let tree = context.tree();
    let parent = tree.parent(link).ok_or(EditError::Detached(link))?;
    let offset = tree.node_index(link);
    context.set_ending_selection(ReadOnlySelection::new(
        parent,
        offset,
        parent,
        offset + 1,
        SelectionDirection::AnchorIsStart,
    ))?;
    Ok(true)
}

/// Climbs from the first selected node to ancestors the selection covers
/// from their very beginning to their end.
fn effective_nodes(tree: &NodeArena, root: NodeId, nodes: &[NodeId], end: (NodeId, usize)) -> Vec<NodeId> {
    let mut lifted = Vec::new();
    let Some(mut first) = nodes.first().copied() else {
        return lifted;
    };
    while let Some(parent) = tree.parent(first) {
        if parent == root || tree.first_child(parent) != Some(first) || !tree.is_editable(parent) {
            break;
        }
        let Some(grandparent) = tree.parent(parent) else {
            break;
        };
        let after_parent = (grandparent, tree.node_index(parent) + 1);
        if tree.compare_points(end, after_parent) == Ordering::Less {
            break;
        }
        lifted.push(parent);
        first = parent;
    }
    lifted.reverse();
    lifted.extend_from_slice(nodes);
    lifted
}

fn enclosing_link(tree: &NodeArena, node: NodeId) -> Option<NodeId> {
    tree.inclusive_ancestors(node)
        .find(|runner| is_link(tree, *runner))
        .filter(|link| tree.is_editable(*link))
}

fn link_range(context: &mut EditingContext<'_>, url: &str) -> Result<bool, EditError> {
    let selection = context.selection();
    let (Some(root), Some(start), Some(end)) = (
        selection.root_element(),
        selection.start_position(),
        selection.end_position(),
    ) else {
        return keep_starting_selection(context);
    };
    if selection.nodes().is_empty() {
        return keep_starting_selection(context);
    }
    let direction = selection.direction();
    let tree = context.tree();
    let start_mark = boundary_mark(tree, start.container(), start.offset());
    let end_mark = boundary_mark(tree, end.container(), end.offset());
    let nodes = effective_nodes(
        tree,
        root,
        selection.nodes(),
        (end.container(), end.offset()),
    );

    let mut handled: Vec<NodeId> = Vec::new();
    let mut current: Option<NodeId> = None;
    for node in nodes {
        let tree = context.tree();
        if handled
            .iter()
            .any(|done| tree.is_inclusive_descendant_of(node, *done))
        {
            continue;
        }
        if let Some(link) = enclosing_link(tree, node) {
            context.set_attribute(link, "href", url)?;
            handled.push(link);
            current = None;
            continue;
        }
        let inside_interactive = tree
            .inclusive_ancestors(node)
            .any(|runner| is_interactive(tree, runner));
        if inside_interactive || !tree.is_editable(node) || !is_phrasing(tree, node) {
            current = None;
            continue;
        }

        let whitespace = is_whitespace_node(tree, node);
        match current {
            Some(link) if tree.previous_sibling(node) == Some(link) => {
                if whitespace && tree.next_sibling(node).is_none() {
                    current = None;
                    continue;
                }
                context.append_child(link, node)?;
            }
            _ if whitespace => {
                current = None;
                continue;
            }
            _ => {
                let parent = tree.parent(node).ok_or(EditError::Detached(node))?;
                let link = new_link(context, url)?;
                context.replace_child(parent, link, node)?;
                context.append_child(link, node)?;
                debug!(?node, ?link, "Wrapped node in a new link");
                current = Some(link);
            }
        }
        handled.push(node);
    }

    SelectionTracker::with_positions(start_mark, end_mark, direction).finish(context)?;
    Ok(true)
}
