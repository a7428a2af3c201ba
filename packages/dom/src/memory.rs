//! In-memory host document.
//!
//! Nodes live in a flat table indexed by [`HostNodeId`]; children are kept
//! as ordered id lists on their parent. Nodes are never freed, a removed
//! node simply becomes detached and can be re-inserted later (undo relies
//! on that).

use crate::host::{HostDocument, HostError, HostNodeId, HostSelection, NodeKind};
use serde::{Deserialize, Serialize};

/// Node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MemoryContent {
    /// Element with lowercase tag and ordered attributes
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },

    /// Text node
    Text { content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    pub content: MemoryContent,
    pub parent: Option<HostNodeId>,
    pub children: Vec<HostNodeId>,
}

/// Document tree rooted at a `body` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    nodes: Vec<MemoryNode>,
    body: HostNodeId,
    selection: Option<HostSelection>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: HostNodeId(0),
            selection: None,
        };
        doc.body = doc.push(MemoryContent::Element {
            tag: "body".to_string(),
            attributes: Vec::new(),
        });
        doc
    }

    pub fn body(&self) -> HostNodeId {
        self.body
    }

    pub fn node(&self, id: HostNodeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builder helper: create an element with attributes and append it.
    pub fn append_element(
        &mut self,
        parent: HostNodeId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<HostNodeId, HostError> {
        let element = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(element, name, value)?;
        }
        self.append_child(parent, element)?;
        Ok(element)
    }

    /// Builder helper: create a text node and append it.
    pub fn append_text(&mut self, parent: HostNodeId, text: &str) -> Result<HostNodeId, HostError> {
        let node = self.create_text_node(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Depth-first search for the first element with `tag`.
    pub fn query(&self, tag: &str) -> Option<HostNodeId> {
        let tag = tag.to_ascii_lowercase();
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if let MemoryContent::Element { tag: node_tag, .. } = &node.content {
                if *node_tag == tag && id != self.body {
                    return Some(id);
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    fn push(&mut self, content: MemoryContent) -> HostNodeId {
        let id = HostNodeId(self.nodes.len() as u32);
        self.nodes.push(MemoryNode {
            content,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn get(&self, id: HostNodeId) -> Result<&MemoryNode, HostError> {
        self.nodes.get(id.0 as usize).ok_or(HostError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: HostNodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(HostError::UnknownNode(id))
    }

    fn attributes_mut(&mut self, id: HostNodeId) -> Result<&mut Vec<(String, String)>, HostError> {
        match &mut self.get_mut(id)?.content {
            MemoryContent::Element { attributes, .. } => Ok(attributes),
            MemoryContent::Text { .. } => Err(HostError::NotAnElement(id)),
        }
    }

    fn ensure_element(&self, id: HostNodeId) -> Result<(), HostError> {
        match self.get(id)?.content {
            MemoryContent::Element { .. } => Ok(()),
            MemoryContent::Text { .. } => Err(HostError::NotAnElement(id)),
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: HostNodeId, node: HostNodeId) -> bool {
        let mut runner = Some(node);
        while let Some(current) = runner {
            if current == ancestor {
                return true;
            }
            runner = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, child: HostNodeId) -> Result<(), HostError> {
        if let Some(parent) = self.get(child)?.parent {
            self.get_mut(parent)?.children.retain(|c| *c != child);
            self.get_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn prepare_insert(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        self.ensure_element(parent)?;
        self.get(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(HostError::Cycle { parent, child });
        }
        self.detach(child)
    }

    fn child_index(&self, parent: HostNodeId, child: HostNodeId) -> Result<usize, HostError> {
        self.get(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(HostError::NotAChild { parent, child })
    }

    fn write_styles(&mut self, element: HostNodeId, styles: Vec<(String, String)>) -> Result<(), HostError> {
        if styles.is_empty() {
            let attributes = self.attributes_mut(element)?;
            attributes.retain(|(name, _)| name != "style");
            return Ok(());
        }
        let value = styles
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(element, "style", &value)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an inline `style` attribute into ordered `(property, value)` pairs.
pub fn parse_style(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect()
}

impl HostDocument for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> HostNodeId {
        self.push(MemoryContent::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    fn create_text_node(&mut self, text: &str) -> HostNodeId {
        self.push(MemoryContent::Text {
            content: text.to_string(),
        })
    }

    fn node_kind(&self, node: HostNodeId) -> Result<NodeKind, HostError> {
        Ok(match self.get(node)?.content {
            MemoryContent::Element { .. } => NodeKind::Element,
            MemoryContent::Text { .. } => NodeKind::Text,
        })
    }

    fn node_name(&self, node: HostNodeId) -> Result<String, HostError> {
        Ok(match &self.get(node)?.content {
            MemoryContent::Element { tag, .. } => tag.to_ascii_uppercase(),
            MemoryContent::Text { .. } => "#text".to_string(),
        })
    }

    fn parent_node(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.node(node)?.parent
    }

    fn first_child(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.node(node)?.children.first().copied()
    }

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId> {
        let parent = self.node(node)?.parent?;
        let siblings = &self.node(parent)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    fn attributes(&self, node: HostNodeId) -> Vec<(String, String)> {
        match self.node(node).map(|n| &n.content) {
            Some(MemoryContent::Element { attributes, .. }) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn text(&self, node: HostNodeId) -> Option<String> {
        match &self.node(node)?.content {
            MemoryContent::Text { content } => Some(content.clone()),
            MemoryContent::Element { .. } => None,
        }
    }

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.content {
            MemoryContent::Text { content } => {
                *content = text.to_string();
                Ok(())
            }
            MemoryContent::Element { .. } => Err(HostError::NotText(node)),
        }
    }

    fn append_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        reference: Option<HostNodeId>,
    ) -> Result<(), HostError> {
        if let Some(reference) = reference {
            self.child_index(parent, reference)?;
            if reference == child {
                return Ok(());
            }
        }
        self.prepare_insert(parent, child)?;
        let index = match reference {
            Some(reference) => self.child_index(parent, reference)?,
            None => self.get(parent)?.children.len(),
        };
        self.get_mut(parent)?.children.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        let index = self.child_index(parent, child)?;
        self.get_mut(parent)?.children.remove(index);
        self.get_mut(child)?.parent = None;
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: HostNodeId,
        new_child: HostNodeId,
        old_child: HostNodeId,
    ) -> Result<(), HostError> {
        self.child_index(parent, old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        self.prepare_insert(parent, new_child)?;
        let index = self.child_index(parent, old_child)?;
        self.get_mut(parent)?.children[index] = new_child;
        self.get_mut(new_child)?.parent = Some(parent);
        self.get_mut(old_child)?.parent = None;
        Ok(())
    }

    fn set_attribute(&mut self, element: HostNodeId, name: &str, value: &str) -> Result<(), HostError> {
        let name = name.to_ascii_lowercase();
        let attributes = self.attributes_mut(element)?;
        match attributes.iter_mut().find(|(attr_name, _)| *attr_name == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
        Ok(())
    }

    fn remove_attribute(&mut self, element: HostNodeId, name: &str) -> Result<(), HostError> {
        let name = name.to_ascii_lowercase();
        let attributes = self.attributes_mut(element)?;
        let before = attributes.len();
        attributes.retain(|(attr_name, _)| *attr_name != name);
        if attributes.len() == before {
            return Err(HostError::MissingAttribute { node: element, name });
        }
        Ok(())
    }

    fn insert_attribute(
        &mut self,
        element: HostNodeId,
        index: usize,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        let name = name.to_ascii_lowercase();
        let attributes = self.attributes_mut(element)?;
        attributes.retain(|(attr_name, _)| *attr_name != name);
        let index = index.min(attributes.len());
        attributes.insert(index, (name, value.to_string()));
        Ok(())
    }

    fn style(&self, element: HostNodeId, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        parse_style(&self.attribute(element, "style")?)
            .into_iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value)
    }

    fn set_style(
        &mut self,
        element: HostNodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        self.ensure_element(element)?;
        let property = property.to_ascii_lowercase();
        let mut styles = parse_style(&self.attribute(element, "style").unwrap_or_default());
        let value = value.filter(|v| !v.is_empty());
        match (styles.iter().position(|(name, _)| *name == property), value) {
            (Some(index), Some(value)) => styles[index].1 = value.to_string(),
            (Some(index), None) => {
                styles.remove(index);
            }
            (None, Some(value)) => styles.push((property, value.to_string())),
            (None, None) => return Ok(()),
        }
        self.write_styles(element, styles)
    }

    fn selection(&self) -> Option<HostSelection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<HostSelection>) {
        self.selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_query() {
        let mut doc = MemoryDocument::new();
        let p = doc.append_element(doc.body(), "P", &[("class", "x")]).unwrap();
        let text = doc.append_text(p, "hello").unwrap();

        assert_eq!(doc.query("p"), Some(p));
        assert_eq!(doc.node_name(p).unwrap(), "P");
        assert_eq!(doc.parent_node(text), Some(p));
        assert_eq!(doc.attribute(p, "CLASS"), Some("x".to_string()));
    }

    #[test]
    fn test_insert_moves_attached_child() {
        let mut doc = MemoryDocument::new();
        let a = doc.append_element(doc.body(), "a", &[]).unwrap();
        let b = doc.append_element(doc.body(), "b", &[]).unwrap();
        let text = doc.append_text(a, "t").unwrap();

        doc.append_child(b, text).unwrap();

        assert!(doc.child_nodes(a).is_empty());
        assert_eq!(doc.child_nodes(b), vec![text]);
    }

    #[test]
    fn test_insert_rejects_cycle() {
        let mut doc = MemoryDocument::new();
        let a = doc.append_element(doc.body(), "a", &[]).unwrap();
        let b = doc.append_element(a, "b", &[]).unwrap();

        let result = doc.append_child(b, a);
        assert_eq!(result, Err(HostError::Cycle { parent: b, child: a }));
    }

    #[test]
    fn test_remove_missing_attribute_fails() {
        let mut doc = MemoryDocument::new();
        let a = doc.append_element(doc.body(), "a", &[]).unwrap();
        assert!(doc.remove_attribute(a, "href").is_err());
    }

    #[test]
    fn test_style_round_trip() {
        let mut doc = MemoryDocument::new();
        let span = doc.append_element(doc.body(), "span", &[]).unwrap();

        doc.set_style(span, "color", Some("red")).unwrap();
        doc.set_style(span, "font-weight", Some("bold")).unwrap();
        assert_eq!(
            doc.attribute(span, "style"),
            Some("color: red; font-weight: bold".to_string())
        );

        doc.set_style(span, "color", None).unwrap();
        doc.set_style(span, "font-weight", Some("")).unwrap();
        assert_eq!(doc.attribute(span, "style"), None);
        assert_eq!(doc.style(span, "color"), None);
    }

    #[test]
    fn test_insert_attribute_at_index() {
        let mut doc = MemoryDocument::new();
        let a = doc
            .append_element(doc.body(), "a", &[("href", "x"), ("title", "t")])
            .unwrap();

        doc.remove_attribute(a, "href").unwrap();
        doc.insert_attribute(a, 0, "HREF", "x").unwrap();
        let names: Vec<String> = doc.attributes(a).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["href", "title"]);

        doc.insert_attribute(a, 9, "href", "y").unwrap();
        assert_eq!(
            doc.attributes(a),
            vec![
                ("title".to_string(), "t".to_string()),
                ("href".to_string(), "y".to_string())
            ]
        );
    }
}
