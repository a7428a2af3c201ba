//! `unlink`: unwraps every editable link around the caret or touched by
//! the selection. Nested links are unwrapped too.

use crate::content_model::is_link;
use crate::keep_starting_selection;
use inkstone_editor::{EditError, EditingContext, NodeId, SelectionTracker};
use tracing::debug;

pub fn unlink(
    context: &mut EditingContext<'_>,
    _user_interface: bool,
    _value: &str,
) -> Result<bool, EditError> {
    let selection = context.selection();
    if selection.is_empty() {
        return keep_starting_selection(context);
    }
    let candidates: Vec<NodeId> = match selection.focus() {
        Some(focus) if selection.is_caret() || selection.nodes().is_empty() => {
            vec![focus.container()]
        }
        _ => selection.nodes().to_vec(),
    };

    let tree = context.tree();
    let mut links: Vec<NodeId> = Vec::new();
    for node in candidates {
        for runner in tree.inclusive_ancestors(node) {
            if is_link(tree, runner) && tree.is_editable(runner) && !links.contains(&runner) {
                links.push(runner);
            }
        }
    }
    if links.is_empty() {
        return keep_starting_selection(context);
    }

    debug!(count = links.len(), "Unwrapping links");
    let mut tracker = SelectionTracker::new(context)?;
    for link in links {
        tracker.unwrap_element(context, link)?;
    }
    tracker.finish(context)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_dom::fixture::parse;
    use inkstone_dom::serialize::inner_html_with_selection;
    use inkstone_dom::HostDocument;

    fn run(source: &str) -> (bool, String) {
        let mut doc = parse(source).unwrap();
        let (executed, ending) = {
            let mut context = EditingContext::new(&mut doc, "unlink").unwrap();
            let executed = unlink(&mut context, false, "").unwrap();
            let record = context.into_record().unwrap();
            (executed, record.ending_selection.to_host())
        };
        doc.set_selection(ending);
        let html = inner_html_with_selection(&doc, doc.body(), doc.selection().as_ref());
        (executed, html)
    }

    #[test]
    fn test_nothing_to_unlink() {
        assert_eq!(
            run("<p contenteditable>|abcd</p>"),
            (false, "<p contenteditable>|abcd</p>".to_string())
        );
    }

    #[test]
    fn test_caret_inside_link() {
        assert_eq!(run("<p contenteditable><a href=\"foo\">b|ar</a></p>").1, "<p contenteditable>b|ar</p>");
        assert_eq!(run("<p contenteditable><a href=\"foo\">bar|</a></p>").1, "<p contenteditable>bar|</p>");
        assert_eq!(
            run("<p contenteditable><a href=\"foo\"><b>b|ar</b></a></p>").1,
            "<p contenteditable><b>b|ar</b></p>"
        );
    }

    #[test]
    fn test_range_around_link() {
        assert_eq!(run("<p contenteditable>^<a href=\"foo\">bar</a>|</p>").1, "<p contenteditable>^bar|</p>");
        assert_eq!(
            run("<p contenteditable>^<a class=\"class1\" href=\"url1\" id=\"id1\">bar</a>|</p>").1,
            "<p contenteditable>^bar|</p>"
        );
        assert_eq!(run("<p contenteditable><a href=\"foo\">^bar|</a></p>").1, "<p contenteditable>^bar|</p>");
        assert_eq!(run("<p contenteditable><a href=\"foo\">|bar^</a></p>").1, "<p contenteditable>|bar^</p>");
    }

    #[test]
    fn test_partial_range_unwraps_whole_link() {
        assert_eq!(
            run("<p contenteditable><a href=\"foo\">ab^cd|ef</a></p>").1,
            "<p contenteditable>ab^cd|ef</p>"
        );
        assert_eq!(
            run("<p contenteditable><a href=\"foo\"><b>ab^c</b>d|e</a></p>").1,
            "<p contenteditable><b>ab^c</b>d|e</p>"
        );
        assert_eq!(
            run("<p contenteditable><a href=\"foo\"><b>ab|c</b>d^e</a></p>").1,
            "<p contenteditable><b>ab|c</b>d^e</p>"
        );
    }

    #[test]
    fn test_several_links() {
        assert_eq!(
            run("<p contenteditable>^<a href=\"foo\">bar</a><a href=\"foo2\">bar2</a>|</p>").1,
            "<p contenteditable>^barbar2|</p>"
        );
        assert_eq!(
            run("<p contenteditable><a href=\"foo\">a^bc</a>d<a href=\"foo2\">e|f</a></p>").1,
            "<p contenteditable>a^bcde|f</p>"
        );
        assert_eq!(
            run("<p contenteditable><a href=\"foo\">a|bc</a>d<a href=\"foo2\">e^f</a></p>").1,
            "<p contenteditable>a|bcde^f</p>"
        );
    }
}
