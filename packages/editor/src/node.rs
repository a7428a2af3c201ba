//! # Shadow Node Arena
//!
//! Mirrors the part of the host tree a command works on. Nodes live in a
//! flat `Vec` and refer to each other through [`NodeId`] indices, so the
//! graph never holds references into itself.
//!
//! ## Design
//!
//! - Parent and sibling links are kept mutually consistent by the linking
//!   helpers; only the owning `EditingContext` calls them
//! - Text nodes share the text they were created from and keep a
//!   `(start, end)` character range into it, so a node split several times
//!   still reports its own slice
//! - Nodes are never freed; a removed node is just unlinked

use inkstone_dom::HostNodeId;
use std::cmp::Ordering;
use std::rc::Rc;

/// Index of a node in the shadow arena of one editing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text {
        source: Rc<str>,
        start: usize,
        end: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EditingNode {
    pub(crate) data: NodeData,
    pub(crate) host: HostNodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
}

impl EditingNode {
    fn new(data: NodeData, host: HostNodeId) -> Self {
        Self {
            data,
            host,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    /// Host node this shadow node mirrors.
    pub fn host(&self) -> HostNodeId {
        self.host
    }

    /// Uppercase tag name, or `#text`.
    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Element { name, .. } => name,
            NodeData::Text { .. } => "#text",
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn attributes(&self) -> &[(String, String)] {
        match &self.data {
            NodeData::Element { attributes, .. } => attributes,
            NodeData::Text { .. } => &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes()
            .iter()
            .find(|(attr_name, _)| *attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Text of the retained slice; `None` for elements.
    pub fn text(&self) -> Option<String> {
        match &self.data {
            NodeData::Text { source, start, end } => {
                Some(source.chars().skip(*start).take(end - start).collect())
            }
            NodeData::Element { .. } => None,
        }
    }

    /// Length in characters of a text node, 0 for elements.
    pub fn text_len(&self) -> usize {
        match &self.data {
            NodeData::Text { start, end, .. } => end - start,
            NodeData::Element { .. } => 0,
        }
    }

    /// Signed split offset of a text node.
    ///
    /// Positive: the node keeps the prefix ending at that offset. Negative:
    /// the node keeps the suffix starting at `-offset`. Zero: untouched.
    /// A slice cut on both sides reports its start as a suffix.
    pub fn split_offset(&self) -> isize {
        match &self.data {
            NodeData::Text { source, start, end } => {
                let length = source.chars().count();
                if *start > 0 {
                    -(*start as isize)
                } else if *end < length {
                    *end as isize
                } else {
                    0
                }
            }
            NodeData::Element { .. } => 0,
        }
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.data {
            match attributes.iter_mut().find(|(attr_name, _)| attr_name == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub(crate) fn remove_attribute(&mut self, name: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.data {
            attributes.retain(|(attr_name, _)| attr_name != name);
        }
    }

    pub(crate) fn replace_attributes(&mut self, replacement: Vec<(String, String)>) {
        if let NodeData::Element { attributes, .. } = &mut self.data {
            *attributes = replacement;
        }
    }
}

/// Flat storage for the shadow tree plus all read-only tree queries.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<EditingNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &EditingNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut EditingNode {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc_element(&mut self, name: &str, host: HostNodeId) -> NodeId {
        self.alloc(
            NodeData::Element {
                name: name.to_ascii_uppercase(),
                attributes: Vec::new(),
            },
            host,
        )
    }

    pub(crate) fn alloc_text(&mut self, text: &str, host: HostNodeId) -> NodeId {
        let length = text.chars().count();
        self.alloc(
            NodeData::Text {
                source: Rc::from(text),
                start: 0,
                end: length,
            },
            host,
        )
    }

    pub(crate) fn alloc(&mut self, data: NodeData, host: HostNodeId) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(EditingNode::new(data, host));
        id
    }

    // Linking. Callers validate preconditions first.

    pub(crate) fn link_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let prev = match reference {
            Some(reference) => self.node(reference).prev_sibling,
            None => self.node(parent).last_child,
        };
        {
            let node = self.node_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        match reference {
            Some(reference) => self.node_mut(reference).prev_sibling = Some(child),
            None => self.node_mut(parent).last_child = Some(child),
        }
    }

    pub(crate) fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = self.node(child);
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(prev) => self.node_mut(prev).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let node = self.node_mut(child);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    // Structure

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            arena: self,
            next: self.first_child(id),
        }
    }

    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Index of `id` among its siblings.
    pub fn node_index(&self, id: NodeId) -> usize {
        let mut index = 0;
        let mut runner = self.previous_sibling(id);
        while let Some(prev) = runner {
            index += 1;
            runner = self.previous_sibling(prev);
        }
        index
    }

    /// Largest valid offset inside `id`: text length or child count.
    pub fn max_offset(&self, id: NodeId) -> usize {
        if self.is_text(id) {
            self.node(id).text_len()
        } else {
            self.child_count(id)
        }
    }

    // Content

    pub fn node_name(&self, id: NodeId) -> &str {
        self.node(id).node_name()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_element()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id).is_text()
    }

    pub fn text(&self, id: NodeId) -> Option<String> {
        self.node(id).text()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.node(id).has_attribute(name)
    }

    pub fn split_offset(&self, id: NodeId) -> isize {
        self.node(id).split_offset()
    }

    pub fn host(&self, id: NodeId) -> HostNodeId {
        self.node(id).host
    }

    // Ancestry

    /// True when `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut runner = self.parent(node);
        while let Some(current) = runner {
            if current == ancestor {
                return true;
            }
            runner = self.parent(current);
        }
        false
    }

    pub fn is_inclusive_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.is_descendant_of(node, ancestor)
    }

    /// Closest inclusive ancestor shared by both nodes.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let ancestors: Vec<NodeId> = self.inclusive_ancestors(a).collect();
        self.inclusive_ancestors(b)
            .find(|candidate| ancestors.contains(candidate))
    }

    pub fn inclusive_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    /// Nearest `contenteditable` attribute decides; `false` disables.
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        for runner in self.inclusive_ancestors(id) {
            if let Some(value) = self.attribute(runner, "contenteditable") {
                return !value.eq_ignore_ascii_case("false");
            }
        }
        false
    }

    /// A node is editable when its parent's content is editable.
    pub fn is_editable(&self, id: NodeId) -> bool {
        self.parent(id)
            .map(|parent| self.is_content_editable(parent))
            .unwrap_or(false)
    }

    // Document order

    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        self.first_child(id)
            .or_else(|| self.next_node_skipping_children(id))
    }

    pub fn next_node_skipping_children(&self, id: NodeId) -> Option<NodeId> {
        self.inclusive_ancestors(id)
            .find_map(|runner| self.next_sibling(runner))
    }

    pub fn previous_node(&self, id: NodeId) -> Option<NodeId> {
        match self.previous_sibling(id) {
            Some(prev) => Some(self.last_within(prev)),
            None => self.parent(id),
        }
    }

    /// Deepest last descendant of `id`, or `id` itself.
    pub fn last_within(&self, id: NodeId) -> NodeId {
        let mut runner = id;
        while let Some(last) = self.last_child(runner) {
            runner = last;
        }
        runner
    }

    /// Nodes in document order from boundary point `start` up to, not
    /// including, the node at boundary point `end`, staying inside `root`.
    pub fn nodes_between(&self, root: NodeId, start: (NodeId, usize), end: (NodeId, usize)) -> Vec<NodeId> {
        if start == end {
            return Vec::new();
        }
        let node_at = |(container, offset): (NodeId, usize)| {
            self.child_at(container, offset)
                .or_else(|| self.next_node_skipping_children(container))
        };
        let stop = node_at(end);

        let mut nodes = Vec::new();
        let mut runner = node_at(start);
        while let Some(node) = runner {
            if Some(node) == stop || !self.is_inclusive_descendant_of(node, root) {
                break;
            }
            nodes.push(node);
            runner = self.next_node(node);
        }
        nodes
    }

    /// Child indices from the root of `id`'s tree down to `id`.
    fn path_to(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .inclusive_ancestors(id)
            .filter(|runner| self.parent(*runner).is_some())
            .map(|runner| self.node_index(runner))
            .collect();
        path.reverse();
        path
    }

    /// Document order of two boundary points in the same tree.
    pub fn compare_points(&self, a: (NodeId, usize), b: (NodeId, usize)) -> Ordering {
        if a.0 == b.0 {
            return a.1.cmp(&b.1);
        }
        // A boundary point inside a container sorts by the child it precedes.
        let mut path_a = self.path_to(a.0);
        let mut path_b = self.path_to(b.0);
        path_a.push(a.1);
        path_b.push(b.1);
        let common = path_a.iter().zip(&path_b).take_while(|(x, y)| x == y).count();
        match (path_a.get(common), path_b.get(common)) {
            (Some(x), Some(y)) => x.cmp(y),
            // The shorter path stops at a container boundary that precedes
            // everything inside the child it points at.
            (None, _) => Ordering::Less,
            (_, None) => Ordering::Greater,
        }
    }
}

pub struct Children<'a> {
    arena: &'a NodeArena,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena.next_sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(n: u32) -> HostNodeId {
        HostNodeId(n)
    }

    /// `<div contenteditable><p>ab<b>cd</b></p><span>ef</span></div>`
    fn sample() -> (NodeArena, Vec<NodeId>) {
        let mut arena = NodeArena::new();
        let div = arena.alloc_element("div", host(0));
        arena.node_mut(div).set_attribute("contenteditable", "");
        let p = arena.alloc_element("p", host(1));
        let ab = arena.alloc_text("ab", host(2));
        let b = arena.alloc_element("b", host(3));
        let cd = arena.alloc_text("cd", host(4));
        let span = arena.alloc_element("span", host(5));
        let ef = arena.alloc_text("ef", host(6));
        arena.link_before(div, p, None);
        arena.link_before(p, ab, None);
        arena.link_before(p, b, None);
        arena.link_before(b, cd, None);
        arena.link_before(div, span, None);
        arena.link_before(span, ef, None);
        (arena, vec![div, p, ab, b, cd, span, ef])
    }

    #[test]
    fn test_links_and_indices() {
        let (arena, ids) = sample();
        let [div, p, ab, b, _cd, span, _ef] = ids[..] else {
            panic!("unexpected sample");
        };

        assert_eq!(arena.child_nodes(div), vec![p, span]);
        assert_eq!(arena.node_index(b), 1);
        assert_eq!(arena.child_at(p, 0), Some(ab));
        assert_eq!(arena.max_offset(ab), 2);
        assert_eq!(arena.max_offset(p), 2);
        assert_eq!(arena.node_name(b), "B");
        assert_eq!(arena.node_name(ab), "#text");
    }

    #[test]
    fn test_unlink_keeps_siblings_consistent() {
        let (mut arena, ids) = sample();
        let (div, p, span) = (ids[0], ids[1], ids[5]);

        arena.unlink(p);
        assert_eq!(arena.first_child(div), Some(span));
        assert_eq!(arena.previous_sibling(span), None);
        assert_eq!(arena.parent(p), None);

        arena.link_before(div, p, Some(span));
        assert_eq!(arena.child_nodes(div), vec![p, span]);
        assert_eq!(arena.last_child(div), Some(span));
    }

    #[test]
    fn test_document_order_traversal() {
        let (arena, ids) = sample();
        let [div, p, ab, b, cd, span, ef] = ids[..] else {
            panic!("unexpected sample");
        };

        let mut order = vec![div];
        let mut runner = arena.next_node(div);
        while let Some(node) = runner {
            order.push(node);
            runner = arena.next_node(node);
        }
        assert_eq!(order, vec![div, p, ab, b, cd, span, ef]);

        assert_eq!(arena.next_node_skipping_children(p), Some(span));
        assert_eq!(arena.previous_node(span), Some(cd));
        assert_eq!(arena.previous_node(ab), Some(p));
        assert_eq!(arena.last_within(div), ef);
    }

    #[test]
    fn test_ancestry_and_editability() {
        let (mut arena, ids) = sample();
        let [div, p, ab, b, cd, span, ef] = ids[..] else {
            panic!("unexpected sample");
        };

        assert!(arena.is_descendant_of(cd, div));
        assert!(!arena.is_descendant_of(div, div));
        assert_eq!(arena.common_ancestor(cd, ab), Some(p));
        assert_eq!(arena.common_ancestor(ef, cd), Some(div));

        assert!(arena.is_content_editable(b));
        assert!(arena.is_editable(p));
        assert!(!arena.is_editable(div));

        arena.node_mut(span).set_attribute("contenteditable", "false");
        assert!(!arena.is_content_editable(ef));
        assert!(arena.is_editable(span));
        assert!(!arena.is_editable(ef));
    }

    #[test]
    fn test_compare_points() {
        let (arena, ids) = sample();
        let [div, p, ab, _b, cd, span, _ef] = ids[..] else {
            panic!("unexpected sample");
        };

        assert_eq!(arena.compare_points((ab, 1), (ab, 2)), Ordering::Less);
        assert_eq!(arena.compare_points((cd, 0), (ab, 2)), Ordering::Greater);
        assert_eq!(arena.compare_points((div, 1), (cd, 2)), Ordering::Greater);
        assert_eq!(arena.compare_points((p, 0), (ab, 0)), Ordering::Less);
        assert_eq!(arena.compare_points((span, 0), (div, 2)), Ordering::Less);
        assert_eq!(arena.compare_points((div, 1), (div, 1)), Ordering::Equal);
    }

    #[test]
    fn test_text_slices_and_split_offset() {
        let mut arena = NodeArena::new();
        let source: Rc<str> = Rc::from("abcdef");
        let whole = arena.alloc(
            NodeData::Text { source: source.clone(), start: 0, end: 6 },
            host(0),
        );
        let prefix = arena.alloc(
            NodeData::Text { source: source.clone(), start: 0, end: 2 },
            host(1),
        );
        let suffix = arena.alloc(NodeData::Text { source, start: 2, end: 6 }, host(2));

        assert_eq!(arena.split_offset(whole), 0);
        assert_eq!(arena.split_offset(prefix), 2);
        assert_eq!(arena.split_offset(suffix), -2);
        assert_eq!(arena.text(prefix).as_deref(), Some("ab"));
        assert_eq!(arena.text(suffix).as_deref(), Some("cdef"));
    }
}
