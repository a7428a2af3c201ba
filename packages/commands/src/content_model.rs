//! Content categories the reference commands care about.

use inkstone_editor::{NodeArena, NodeId};

const PHRASING: &[&str] = &[
    "A", "ABBR", "ACRONYM", "AUDIO", "B", "BDI", "BDO", "BIG", "BLINK", "BR", "BUTTON",
    "CANVAS", "CITE", "CODE", "DATA", "DATALIST", "DEL", "DFN", "EM", "EMBED", "FONT", "I",
    "IFRAME", "IMG", "INPUT", "INS", "KBD", "LABEL", "MAP", "MARK", "METER", "NOBR",
    "NOSCRIPT", "OBJECT", "OUTPUT", "PROGRESS", "Q", "RUBY", "S", "SAMP", "SCRIPT", "SELECT",
    "SMALL", "SPAN", "STRIKE", "STRONG", "SUB", "SUP", "TEMPLATE", "TEXTAREA", "TIME", "TT",
    "U", "VAR", "VIDEO", "WBR",
];

const INTERACTIVE: &[&str] = &[
    "A", "BUTTON", "DETAILS", "EMBED", "IFRAME", "INPUT", "KEYGEN", "LABEL", "SELECT",
    "TEXTAREA",
];

/// Tags `removeFormat` strips.
const FORMATTING: &[&str] = &[
    "ABBR", "ACRONYM", "B", "BDI", "BDO", "BIG", "BLINK", "CITE", "CODE", "DFN", "EM", "FONT",
    "I", "INS", "KBD", "MARK", "NOBR", "Q", "S", "SAMP", "SMALL", "STRIKE", "STRONG", "SUB",
    "SUP", "TT", "U", "VAR",
];

/// Text is always phrasing content.
pub fn is_phrasing(tree: &NodeArena, node: NodeId) -> bool {
    tree.is_text(node) || PHRASING.contains(&tree.node_name(node))
}

pub fn is_interactive(tree: &NodeArena, node: NodeId) -> bool {
    tree.is_element(node) && INTERACTIVE.contains(&tree.node_name(node))
}

pub fn is_link(tree: &NodeArena, node: NodeId) -> bool {
    tree.node_name(node) == "A"
}

/// A formatting element whose parent content is editable.
pub fn is_removable_formatting(tree: &NodeArena, node: NodeId) -> bool {
    tree.is_element(node)
        && FORMATTING.contains(&tree.node_name(node))
        && tree
            .parent(node)
            .map(|parent| tree.is_content_editable(parent))
            .unwrap_or(false)
}

/// Text node made of spaces, tabs and line breaks only.
pub fn is_whitespace_node(tree: &NodeArena, node: NodeId) -> bool {
    tree.text(node)
        .map(|text| text.chars().all(|ch| matches!(ch, ' ' | '\t' | '\r' | '\n')))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_dom::fixture::parse;
    use inkstone_editor::EditingContext;

    #[test]
    fn test_categories() {
        let mut doc = parse("<div contenteditable>^<p><b>x</b> <a>y</a><button>z</button></p>|</div>").unwrap();
        let context = EditingContext::new(&mut doc, "test").unwrap();
        let tree = context.tree();
        let nodes = context.selection().nodes();
        let name = |node: NodeId| tree.node_name(node).to_string();

        let p = nodes[0];
        let b = nodes[1];
        let space = nodes[3];
        let link = nodes[4];
        let button = nodes[6];
        assert_eq!(name(p), "P");
        assert_eq!(name(button), "BUTTON");

        assert!(!is_phrasing(tree, p));
        assert!(is_phrasing(tree, b));
        assert!(is_phrasing(tree, space));
        assert!(is_whitespace_node(tree, space));
        assert!(!is_whitespace_node(tree, b));

        assert!(is_interactive(tree, link));
        assert!(is_interactive(tree, button));
        assert!(!is_interactive(tree, b));
        assert!(is_link(tree, link));

        assert!(is_removable_formatting(tree, b));
        assert!(!is_removable_formatting(tree, link));
    }

    #[test]
    fn test_formatting_needs_editable_parent() {
        let mut doc =
            parse("<div contenteditable>^<p contenteditable=\"false\"><b>x</b></p><i>y</i>|</div>").unwrap();
        let context = EditingContext::new(&mut doc, "test").unwrap();
        let tree = context.tree();
        let nodes = context.selection().nodes();

        assert_eq!(tree.node_name(nodes[1]), "B");
        assert!(!is_removable_formatting(tree, nodes[1]));
        assert_eq!(tree.node_name(nodes[3]), "I");
        assert!(is_removable_formatting(tree, nodes[3]));
    }
}
