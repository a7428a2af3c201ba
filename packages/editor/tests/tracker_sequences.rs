//! Selection tracking across long removal/unwrap sequences

use anyhow::Result;
use inkstone_dom::fixture::parse;
use inkstone_dom::serialize::outer_html;
use inkstone_editor::{EditingContext, NodeArena, NodeId, ReadOnlySelection, SelectionTracker};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cmp::Ordering;
use std::fmt::Display;

const FIXTURE: &str =
    "<div contenteditable>x<p>a^b<b>c</b></p><p>d<i>e|f</i></p>y<p>g<s>h</s></p>z</div>";

fn fail(err: impl Display) -> TestCaseError {
    TestCaseError::fail(err.to_string())
}

fn descendants(tree: &NodeArena, root: NodeId) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut runner = tree.first_child(root);
    while let Some(node) = runner {
        if !tree.is_descendant_of(node, root) {
            break;
        }
        nodes.push(node);
        runner = tree.next_node(node);
    }
    nodes
}

fn check_valid(tree: &NodeArena, root: NodeId, selection: &ReadOnlySelection) -> Result<(), TestCaseError> {
    let (Some(start), Some(end)) = (selection.start_container(), selection.end_container()) else {
        return Err(fail("tracked selection is empty"));
    };
    let start = (start, selection.start_offset());
    let end = (end, selection.end_offset());
    for (container, offset) in [start, end] {
        prop_assert!(tree.is_inclusive_descendant_of(container, root));
        prop_assert!(offset <= tree.max_offset(container));
    }
    prop_assert_ne!(tree.compare_points(start, end), Ordering::Greater);
    Ok(())
}

/// Each step picks a node by `pick` and unwraps it when `unwrap` is set and
/// it is an element, otherwise removes it.
fn run_sequence(steps: &[(usize, bool)]) -> Result<(), TestCaseError> {
    let mut doc = parse(FIXTURE).map_err(fail)?;
    let div = doc.query("div").ok_or_else(|| fail("missing root"))?;
    let before = outer_html(&doc, div);

    let record = {
        let mut context = EditingContext::new(&mut doc, "strip").map_err(fail)?;
        let root = context
            .selection()
            .root_element()
            .ok_or_else(|| fail("missing editing root"))?;
        let mut tracker = SelectionTracker::new(&context).map_err(fail)?;

        for &(pick, unwrap) in steps {
            let candidates = descendants(context.tree(), root);
            if candidates.is_empty() {
                break;
            }
            let node = candidates[pick % candidates.len()];
            if unwrap && context.tree().is_element(node) {
                tracker.unwrap_element(&mut context, node).map_err(fail)?;
            } else {
                tracker.remove_node(&mut context, node).map_err(fail)?;
            }
            let selection = tracker.selection(context.tree()).map_err(fail)?;
            check_valid(context.tree(), root, &selection)?;
        }
        tracker.finish(&mut context).map_err(fail)?;
        context.into_record().map_err(fail)?
    };

    record.undo(&mut doc).map_err(fail)?;
    prop_assert_eq!(outer_html(&doc, div), before.clone());
    record.redo(&mut doc).map_err(fail)?;
    record.undo(&mut doc).map_err(fail)?;
    prop_assert_eq!(outer_html(&doc, div), before);
    Ok(())
}

proptest! {
    #[test]
    fn tracker_survives_removal_sequences(
        steps in prop::collection::vec((any::<usize>(), any::<bool>()), 1..8)
    ) {
        run_sequence(&steps)?;
    }

    #[test]
    fn tracker_survives_emptying_the_root(
        steps in prop::collection::vec((any::<usize>(), any::<bool>()), 32..64)
    ) {
        run_sequence(&steps)?;
    }
}

#[test]
fn test_removing_everything_collapses_to_root() -> Result<()> {
    let mut doc = parse(FIXTURE)?;
    let mut context = EditingContext::new(&mut doc, "clear")?;
    let root = context.selection().root_element().expect("root");
    let mut tracker = SelectionTracker::new(&context)?;

    while let Some(child) = context.tree().first_child(root) {
        tracker.remove_node(&mut context, child)?;
    }
    let selection = tracker.selection(context.tree())?;
    assert_eq!(selection.anchor_node(), Some(root));
    assert_eq!(selection.anchor_offset(), 0);
    assert!(selection.is_caret());
    Ok(())
}
