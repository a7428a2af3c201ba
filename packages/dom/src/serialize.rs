//! HTML serialization with selection markers.
//!
//! The marker syntax matches the fixture parser: `^` is the anchor, `|` the
//! focus. A caret prints a single `|`.

use crate::host::{HostDocument, HostNodeId, HostSelection, NodeKind};

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "wbr"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Outer HTML of `node`, ignoring the selection.
pub fn outer_html(doc: &dyn HostDocument, node: HostNodeId) -> String {
    let mut sink = String::new();
    write_node(doc, node, None, &mut sink);
    sink
}

/// Inner HTML of the document body, with the document's selection markers.
pub fn body_html<D: HostDocument + BodyAccess>(doc: &D) -> String {
    inner_html_with_selection(doc, doc.body_node(), doc.selection().as_ref())
}

/// Inner HTML of `node` with markers for `selection`.
pub fn inner_html_with_selection(
    doc: &dyn HostDocument,
    node: HostNodeId,
    selection: Option<&HostSelection>,
) -> String {
    let mut sink = String::new();
    write_children(doc, node, selection, &mut sink);
    sink
}

/// Documents exposing a distinguished root container.
pub trait BodyAccess {
    fn body_node(&self) -> HostNodeId;
}

impl BodyAccess for crate::MemoryDocument {
    fn body_node(&self) -> HostNodeId {
        self.body()
    }
}

fn write_markers(selection: Option<&HostSelection>, node: HostNodeId, offset: usize, sink: &mut String) {
    let Some(selection) = selection else {
        return;
    };
    let at_anchor = selection.anchor_node == node && selection.anchor_offset == offset;
    let at_focus = selection.focus_node == node && selection.focus_offset == offset;
    if at_anchor && !selection.is_collapsed() {
        sink.push('^');
    }
    if at_focus {
        sink.push('|');
    }
}

fn write_children(
    doc: &dyn HostDocument,
    node: HostNodeId,
    selection: Option<&HostSelection>,
    sink: &mut String,
) {
    let children = doc.child_nodes(node);
    for (index, child) in children.iter().enumerate() {
        write_markers(selection, node, index, sink);
        write_node(doc, *child, selection, sink);
    }
    write_markers(selection, node, children.len(), sink);
}

fn write_node(
    doc: &dyn HostDocument,
    node: HostNodeId,
    selection: Option<&HostSelection>,
    sink: &mut String,
) {
    match doc.node_kind(node) {
        Ok(NodeKind::Text) => {
            let text = doc.text(node).unwrap_or_default();
            for (offset, ch) in text.chars().enumerate() {
                write_markers(selection, node, offset, sink);
                escape_char(ch, sink);
            }
            write_markers(selection, node, text.chars().count(), sink);
        }
        Ok(NodeKind::Element) => {
            let tag = doc
                .node_name(node)
                .map(|name| name.to_ascii_lowercase())
                .unwrap_or_default();
            sink.push('<');
            sink.push_str(&tag);
            for (name, value) in doc.attributes(node) {
                sink.push(' ');
                sink.push_str(&name);
                if !value.is_empty() {
                    sink.push_str("=\"");
                    for ch in value.chars() {
                        escape_char(ch, sink);
                    }
                    sink.push('"');
                }
            }
            sink.push('>');
            if is_void_element(&tag) {
                return;
            }
            write_children(doc, node, selection, sink);
            sink.push_str("</");
            sink.push_str(&tag);
            sink.push('>');
        }
        Err(_) => {}
    }
}

fn escape_char(ch: char, sink: &mut String) {
    match ch {
        '&' => sink.push_str("&amp;"),
        '<' => sink.push_str("&lt;"),
        '>' => sink.push_str("&gt;"),
        '"' => sink.push_str("&quot;"),
        _ => sink.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDocument;

    #[test]
    fn test_outer_html() {
        let mut doc = MemoryDocument::new();
        let p = doc
            .append_element(doc.body(), "p", &[("contenteditable", ""), ("class", "a&b")])
            .unwrap();
        doc.append_text(p, "x<y").unwrap();
        doc.append_element(p, "br", &[]).unwrap();

        assert_eq!(
            outer_html(&doc, p),
            "<p contenteditable class=\"a&amp;b\">x&lt;y<br></p>"
        );
    }

    #[test]
    fn test_markers_for_range_and_caret() {
        let mut doc = MemoryDocument::new();
        let p = doc.append_element(doc.body(), "p", &[]).unwrap();
        let text = doc.append_text(p, "abcd").unwrap();

        doc.set_selection(Some(HostSelection {
            anchor_node: text,
            anchor_offset: 1,
            focus_node: p,
            focus_offset: 1,
        }));
        assert_eq!(body_html(&doc), "<p>a^bcd|</p>");

        doc.set_selection(Some(HostSelection::caret(text, 2)));
        assert_eq!(body_html(&doc), "<p>ab|cd</p>");
    }
}
