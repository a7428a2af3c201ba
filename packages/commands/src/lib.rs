//! # Inkstone Commands
//!
//! Reference editing commands built on `inkstone-editor`:
//!
//! - `createLink`: wraps the selection in `<a href>`, or inserts a link at
//!   the caret
//! - `unlink`: removes every link touching the selection
//! - `removeFormat`: strips formatting tags and inline styles
//!
//! ```rust,ignore
//! let mut registry = CommandRegistry::new();
//! inkstone_commands::register_all(&mut registry);
//! let mut editor = Editor::new(registry);
//! editor.exec_command(&mut doc, "createLink", false, "https://example.com")?;
//! ```

pub mod content_model;
mod create_link;
mod remove_format;
mod unlink;

pub use create_link::create_link;
pub use remove_format::remove_format;
pub use unlink::unlink;

use inkstone_editor::{CommandRegistry, EditError, EditingContext, NodeArena, NodeId, TrackablePosition};

pub fn register_all(registry: &mut CommandRegistry) -> &mut CommandRegistry {
    registry
        .register("createLink", create_link)
        .register("unlink", unlink)
        .register("removeFormat", remove_format)
}

/// Ends a command that had nothing to do.
pub(crate) fn keep_starting_selection(context: &mut EditingContext<'_>) -> Result<bool, EditError> {
    let starting = *context.starting_selection();
    context.set_ending_selection(starting)?;
    Ok(false)
}

/// First node after boundary point (`container`, `offset`) without leaving
/// `top`. `None` when the point is at the very end of `top`.
pub(crate) fn node_after_boundary(
    tree: &NodeArena,
    container: NodeId,
    offset: usize,
    top: NodeId,
) -> Option<NodeId> {
    if let Some(child) = tree.child_at(container, offset) {
        return Some(child);
    }
    let mut node = container;
    while node != top {
        if let Some(next) = tree.next_sibling(node) {
            return Some(next);
        }
        node = tree.parent(node)?;
    }
    None
}

/// Whether anything inside `top` precedes `node`.
pub(crate) fn has_content_before(tree: &NodeArena, node: NodeId, top: NodeId) -> bool {
    tree.inclusive_ancestors(node)
        .take_while(|runner| *runner != top)
        .any(|runner| tree.previous_sibling(runner).is_some())
}

/// Node-relative form of a boundary point.
pub(crate) fn boundary_mark(tree: &NodeArena, container: NodeId, offset: usize) -> TrackablePosition {
    match tree.child_at(container, offset) {
        Some(child) => TrackablePosition::Node(child),
        None => match tree.last_child(container) {
            Some(last) => TrackablePosition::AfterNode(last),
            None => TrackablePosition::BeforeAllChildren(container),
        },
    }
}
