//! # Editing Context
//!
//! Runs one command. Every mutation primitive updates the shadow arena,
//! applies the matching [`Operation`] to the host and appends it to the
//! instruction log, in that order of validation: preconditions are checked
//! on the shadow tree before anything touches the host.
//!
//! ## Lifecycle
//!
//! - Construction imports the editable subtree around the host selection and
//!   normalizes the selection (boundary text nodes are split)
//! - The command mutates through the primitives below
//! - `set_ending_selection` finishes the context; later mutations fail
//! - `into_record` hands the log and both selections over in host terms

use crate::config::EditorConfig;
use crate::editing_selection::EditingSelection;
use crate::errors::EditError;
use crate::node::{NodeArena, NodeData, NodeId};
use crate::operations::Operation;
use crate::registry::CommandRegistry;
use crate::selection::{Position, ReadOnlySelection};
use crate::undo_stack::CommandRecord;
use inkstone_dom::{HostDocument, HostError, HostNodeId, HostSelection, NodeKind};
use std::collections::HashMap;
use tracing::debug;

pub struct EditingContext<'h> {
    name: String,
    pub(crate) host: &'h mut dyn HostDocument,
    tree: NodeArena,
    host_map: HashMap<HostNodeId, NodeId>,
    instructions: Vec<Operation>,
    /// Instructions issued while normalizing the selection.
    normalization_len: usize,
    selection: EditingSelection,
    host_selection: Option<HostSelection>,
    starting_selection: ReadOnlySelection,
    ending_selection: Option<ReadOnlySelection>,
    identifier_attribute: String,
}

impl<'h> EditingContext<'h> {
    pub fn new(host: &'h mut dyn HostDocument, name: &str) -> Result<Self, EditError> {
        Self::with_config(host, name, &EditorConfig::default())
    }

    pub fn with_config(
        host: &'h mut dyn HostDocument,
        name: &str,
        config: &EditorConfig,
    ) -> Result<Self, EditError> {
        let host_selection = host.selection();
        let mut context = Self {
            name: name.to_string(),
            host,
            tree: NodeArena::new(),
            host_map: HashMap::new(),
            instructions: Vec::new(),
            normalization_len: 0,
            selection: EditingSelection::empty(),
            host_selection,
            starting_selection: ReadOnlySelection::empty(),
            ending_selection: None,
            identifier_attribute: config.identifier_attribute.to_ascii_lowercase(),
        };
        if let Some(host_selection) = host_selection {
            context.selection = EditingSelection::build(&mut context, &host_selection)?;
        }
        context.starting_selection = context.selection.to_read_only();
        context.normalization_len = context.instructions.len();
        debug!(
            command = %context.name,
            nodes = context.tree.len(),
            splits = context.normalization_len,
            "Created editing context"
        );
        Ok(context)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only view of the shadow tree.
    pub fn tree(&self) -> &NodeArena {
        &self.tree
    }

    pub fn host(&self) -> &dyn HostDocument {
        &*self.host
    }

    pub fn selection(&self) -> &EditingSelection {
        &self.selection
    }

    pub fn starting_selection(&self) -> &ReadOnlySelection {
        &self.starting_selection
    }

    pub fn ending_selection(&self) -> Result<&ReadOnlySelection, EditError> {
        self.ending_selection
            .as_ref()
            .ok_or(EditError::MissingEndingSelection)
    }

    pub fn instructions(&self) -> &[Operation] {
        &self.instructions
    }

    pub fn is_finished(&self) -> bool {
        self.ending_selection.is_some()
    }

    /// Shadow node mirroring `host`, if it was imported or created here.
    pub fn shadow_of(&self, host: HostNodeId) -> Option<NodeId> {
        self.host_map.get(&host).copied()
    }

    /// Sets the selection the command leaves behind and finishes the context.
    pub fn set_ending_selection(&mut self, selection: ReadOnlySelection) -> Result<(), EditError> {
        if self.ending_selection.is_some() {
            return Err(EditError::EndingSelectionAlreadySet);
        }
        if let (Some(anchor), Some(focus)) = (selection.anchor_node(), selection.focus_node()) {
            Position::new(&self.tree, anchor, selection.anchor_offset())?;
            Position::new(&self.tree, focus, selection.focus_offset())?;
        }
        debug!(command = %self.name, ?selection, "Ending selection set");
        self.ending_selection = Some(selection);
        Ok(())
    }

    pub fn exec_command(
        &mut self,
        registry: &CommandRegistry,
        name: &str,
        user_interface: bool,
        value: &str,
    ) -> Result<bool, EditError> {
        let command = registry
            .lookup(name)
            .ok_or_else(|| EditError::UnknownCommand(name.to_string()))?;
        command(self, user_interface, value)
    }

    /// Undo every operation the command issued, newest first. Splits made
    /// while normalizing the selection are kept so the starting selection
    /// stays valid; `into_record` drops them once nothing else is left.
    pub fn rollback(&mut self) -> Result<(), EditError> {
        self.ensure_active()?;
        while self.instructions.len() > self.normalization_len {
            let Some(operation) = self.instructions.pop() else {
                break;
            };
            operation.undo(&mut *self.host)?;
            self.revert_shadow(&operation);
        }
        debug!(command = %self.name, "Rolled back command operations");
        Ok(())
    }

    /// Log and both selections of a finished context, in host terms.
    ///
    /// A command that changed nothing and kept the starting selection leaves
    /// no trace: the normalization splits are undone on the host and the
    /// record comes back empty.
    pub fn into_record(mut self) -> Result<CommandRecord, EditError> {
        let ending = self
            .ending_selection
            .ok_or(EditError::MissingEndingSelection)?;
        let starting_selection = self
            .host_selection
            .map(|raw| ReadOnlySelection::from_host(&raw, self.starting_selection.direction()))
            .unwrap_or_default();
        let untouched = self.instructions.len() == self.normalization_len;
        if untouched && ending == self.starting_selection {
            while let Some(operation) = self.instructions.pop() {
                operation.undo(&mut *self.host)?;
            }
            debug!(command = %self.name, "Dropped normalization of an unchanged document");
            return Ok(CommandRecord {
                name: self.name,
                starting_selection,
                ending_selection: starting_selection,
                operations: Vec::new(),
            });
        }
        let tree = &self.tree;
        let ending_selection = ending.map_nodes(|node| tree.host(node));
        Ok(CommandRecord {
            name: self.name,
            starting_selection,
            ending_selection,
            operations: self.instructions,
        })
    }

    // Node creation

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let host = self.host.create_element(tag);
        let id = self.tree.alloc_element(tag, host);
        self.host_map.insert(host, id);
        id
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        let host = self.host.create_text_node(text);
        let id = self.tree.alloc_text(text, host);
        self.host_map.insert(host, id);
        id
    }

    /// Shallow clone without the identifier attribute. Deep clones fail.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId, EditError> {
        if deep {
            return Err(EditError::DeepCloneUnsupported);
        }
        if self.tree.is_text(node) {
            let text = self.tree.text(node).unwrap_or_default();
            return Ok(self.create_text_node(&text));
        }
        let tag = self.tree.node_name(node).to_ascii_lowercase();
        let attributes = self.tree.node(node).attributes().to_vec();
        let clone = self.create_element(&tag);
        let host = self.tree.host(clone);
        for (name, value) in attributes {
            if name == self.identifier_attribute {
                continue;
            }
            // The clone is detached, so this is not an undoable change.
            self.host.set_attribute(host, &name, &value)?;
            self.tree.node_mut(clone).set_attribute(&name, &value);
        }
        Ok(clone)
    }

    /// Mirror a host subtree into the arena without recording anything.
    pub(crate) fn import_subtree(&mut self, host: HostNodeId) -> Result<NodeId, EditError> {
        let id = match self.host.node_kind(host)? {
            NodeKind::Text => {
                let text = self.host.text(host).ok_or(HostError::NotText(host))?;
                self.tree.alloc_text(&text, host)
            }
            NodeKind::Element => {
                let name = self.host.node_name(host)?;
                let id = self.tree.alloc_element(&name, host);
                let attributes = self.host.attributes(host);
                self.tree.node_mut(id).replace_attributes(attributes);
                id
            }
        };
        self.host_map.insert(host, id);
        for child in self.host.child_nodes(host) {
            let child = self.import_subtree(child)?;
            self.tree.link_before(id, child, None);
        }
        Ok(id)
    }

    // Tree mutation

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.record(Operation::AppendChild {
            parent: self.tree.host(parent),
            new_child: self.tree.host(child),
        })?;
        self.tree.link_before(parent, child, None);
        Ok(())
    }

    /// Inserts `child` before `reference`; `None` appends.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), EditError> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };
        self.ensure_active()?;
        self.check_insertable(parent, child)?;
        self.check_child(parent, reference)?;
        if child == reference {
            return Err(EditError::SameNode(child));
        }
        self.detach(child)?;
        self.record(Operation::InsertBefore {
            parent: self.tree.host(parent),
            new_child: self.tree.host(child),
            ref_child: self.tree.host(reference),
        })?;
        self.tree.link_before(parent, child, Some(reference));
        Ok(())
    }

    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_child(parent, reference)?;
        if child == reference {
            return Err(EditError::SameNode(child));
        }
        let mut next = self.tree.next_sibling(reference);
        if next == Some(child) {
            next = self.tree.next_sibling(child);
        }
        self.insert_before(parent, child, next)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_child(parent, child)?;
        self.record(Operation::RemoveChild {
            parent: self.tree.host(parent),
            old_child: self.tree.host(child),
            ref_child: self.tree.next_sibling(child).map(|next| self.tree.host(next)),
        })?;
        self.tree.unlink(child);
        Ok(())
    }

    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_child(parent, old_child)?;
        if new_child == old_child {
            return Err(EditError::SameNode(new_child));
        }
        self.check_insertable(parent, new_child)?;
        self.detach(new_child)?;
        self.record(Operation::ReplaceChild {
            parent: self.tree.host(parent),
            new_child: self.tree.host(new_child),
            old_child: self.tree.host(old_child),
        })?;
        let next = self.tree.next_sibling(old_child);
        self.tree.unlink(old_child);
        self.tree.link_before(parent, new_child, next);
        Ok(())
    }

    // Attributes and style

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_element(element)?;
        let name = name.to_ascii_lowercase();
        let old_value = self.tree.attribute(element, &name).map(str::to_string);
        self.record(Operation::SetAttribute {
            element: self.tree.host(element),
            name: name.clone(),
            new_value: value.to_string(),
            old_value,
        })?;
        self.tree.node_mut(element).set_attribute(&name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_element(element)?;
        let name = name.to_ascii_lowercase();
        let old_value = self
            .tree
            .attribute(element, &name)
            .map(str::to_string)
            .ok_or_else(|| EditError::MissingAttribute {
                node: element,
                name: name.clone(),
            })?;
        let host = self.tree.host(element);
        let index = self
            .host
            .attributes(host)
            .iter()
            .position(|(attr_name, _)| *attr_name == name)
            .unwrap_or(0);
        self.record(Operation::RemoveAttribute {
            element: host,
            name: name.clone(),
            old_value,
            index,
        })?;
        self.tree.node_mut(element).remove_attribute(&name);
        Ok(())
    }

    /// Sets one inline style property; `None` or `""` removes it.
    pub fn set_style(
        &mut self,
        element: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> Result<(), EditError> {
        self.ensure_active()?;
        self.check_element(element)?;
        let host = self.tree.host(element);
        let old_value = self.host.style(host, property);
        let old_attribute = self
            .host
            .attributes(host)
            .into_iter()
            .enumerate()
            .find(|(_, (name, _))| name == "style")
            .map(|(index, (_, value))| (index, value));
        self.record(Operation::SetStyle {
            element: host,
            property: property.to_string(),
            new_value: value.filter(|value| !value.is_empty()).map(str::to_string),
            old_value,
            old_attribute,
        })?;
        self.refresh_attributes(element);
        Ok(())
    }

    // Text

    /// Splits an attached text node at `offset`. The node keeps the prefix;
    /// a new sibling holding the suffix is inserted after it and returned.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, EditError> {
        self.ensure_active()?;
        let NodeData::Text { source, start, end } = self.tree.node(node).data.clone() else {
            return Err(EditError::NotText(node));
        };
        let parent = self.tree.parent(node).ok_or(EditError::Detached(node))?;
        let length = end - start;
        if offset == 0 || offset >= length {
            return Err(EditError::OffsetOutOfRange { node, offset, length });
        }

        let new_host = self.host.create_text_node("");
        self.record(Operation::SplitText {
            text_node: self.tree.host(node),
            new_node: new_host,
            offset,
        })?;

        self.tree.node_mut(node).data = NodeData::Text {
            source: source.clone(),
            start,
            end: start + offset,
        };
        let new_node = self.tree.alloc(
            NodeData::Text {
                source,
                start: start + offset,
                end,
            },
            new_host,
        );
        self.host_map.insert(new_host, new_node);
        let next = self.tree.next_sibling(node);
        self.tree.link_before(parent, new_node, next);
        Ok(new_node)
    }

    // Internals

    pub(crate) fn ensure_active(&self) -> Result<(), EditError> {
        if self.ending_selection.is_some() {
            return Err(EditError::ContextFinished);
        }
        Ok(())
    }

    fn record(&mut self, operation: Operation) -> Result<(), EditError> {
        debug!(command = %self.name, kind = operation.kind(), "Recording operation");
        operation.redo(&mut *self.host)?;
        self.instructions.push(operation);
        Ok(())
    }

    /// Moving an attached node is logged as a removal first.
    fn detach(&mut self, node: NodeId) -> Result<(), EditError> {
        match self.tree.parent(node) {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    fn check_element(&self, node: NodeId) -> Result<(), EditError> {
        if !self.tree.is_element(node) {
            return Err(EditError::NotElement(node));
        }
        Ok(())
    }

    fn check_child(&self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        if self.tree.parent(child) != Some(parent) {
            return Err(EditError::NotAChild { parent, child });
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        self.check_element(parent)?;
        if self.tree.is_inclusive_descendant_of(parent, child) {
            return Err(EditError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn refresh_attributes(&mut self, element: NodeId) {
        let attributes = self.host.attributes(self.tree.host(element));
        self.tree.node_mut(element).replace_attributes(attributes);
    }

    fn revert_shadow(&mut self, operation: &Operation) {
        let shadow = |host: &HostNodeId| self.host_map.get(host).copied();
        match operation {
            Operation::AppendChild { new_child, .. } | Operation::InsertBefore { new_child, .. } => {
                if let Some(child) = shadow(new_child) {
                    self.tree.unlink(child);
                }
            }
            Operation::RemoveChild { parent, old_child, ref_child } => {
                if let (Some(parent), Some(child)) = (shadow(parent), shadow(old_child)) {
                    let reference = ref_child.as_ref().and_then(shadow);
                    self.tree.link_before(parent, child, reference);
                }
            }
            Operation::ReplaceChild { parent, new_child, old_child } => {
                if let (Some(parent), Some(new_child), Some(old_child)) =
                    (shadow(parent), shadow(new_child), shadow(old_child))
                {
                    let next = self.tree.next_sibling(new_child);
                    self.tree.unlink(new_child);
                    self.tree.link_before(parent, old_child, next);
                }
            }
            Operation::SetAttribute { element, .. }
            | Operation::RemoveAttribute { element, .. }
            | Operation::SetStyle { element, .. } => {
                if let Some(element) = shadow(element) {
                    self.refresh_attributes(element);
                }
            }
            Operation::SplitText { text_node, new_node, .. } => {
                if let (Some(text_node), Some(new_node)) = (shadow(text_node), shadow(new_node)) {
                    if let NodeData::Text { end: suffix_end, .. } = self.tree.node(new_node).data {
                        if let NodeData::Text { end, .. } = &mut self.tree.node_mut(text_node).data {
                            *end = suffix_end;
                        }
                    }
                    self.tree.unlink(new_node);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_dom::fixture::parse;
    use inkstone_dom::serialize::{body_html, outer_html};
    use inkstone_dom::MemoryDocument;

    fn shadow(context: &EditingContext<'_>, tag: &str) -> NodeId {
        let tree = context.tree();
        (0..tree.len())
            .map(NodeId::from_index)
            .find(|id| tree.node_name(*id).eq_ignore_ascii_case(tag))
            .unwrap()
    }

    fn undo_all(doc: &mut MemoryDocument, operations: &[Operation]) {
        for operation in operations.iter().rev() {
            operation.undo(doc).unwrap();
        }
    }

    #[test]
    fn test_append_and_undo() {
        let mut doc = parse("<div contenteditable>|</div>").unwrap();
        let before = body_html(&doc);
        let operations = {
            let mut context = EditingContext::new(&mut doc, "test").unwrap();
            let div = shadow(&context, "div");
            let b = context.create_element("b");
            let text = context.create_text_node("bold");
            context.append_child(b, text).unwrap();
            context.append_child(div, b).unwrap();
            assert_eq!(context.tree().child_nodes(div), vec![b]);
            context.instructions().to_vec()
        };
        assert_eq!(outer_html(&doc, doc.query("div").unwrap()), "<div contenteditable><b>bold</b></div>");

        undo_all(&mut doc, &operations);
        assert_eq!(body_html(&doc), before);
    }

    #[test]
    fn test_moving_attached_node_records_removal() {
        let mut doc = parse("<div contenteditable><b>x</b><i>y</i>|</div>").unwrap();
        let before = body_html(&doc);
        let operations = {
            let mut context = EditingContext::new(&mut doc, "test").unwrap();
            let (div, b) = (shadow(&context, "div"), shadow(&context, "b"));
            context.append_child(div, b).unwrap();
            let kinds: Vec<_> = context.instructions().iter().map(Operation::kind).collect();
            assert_eq!(kinds, vec!["removeChild", "appendChild"]);
            context.instructions().to_vec()
        };
        assert_eq!(outer_html(&doc, doc.query("div").unwrap()), "<div contenteditable><i>y</i><b>x</b></div>");

        undo_all(&mut doc, &operations);
        assert_eq!(body_html(&doc), before);
    }

    #[test]
    fn test_insert_after_and_replace() {
        let mut doc = parse("<div contenteditable><b>x</b><i>y</i>|</div>").unwrap();
        let mut context = EditingContext::new(&mut doc, "test").unwrap();
        let (div, b, i) = (shadow(&context, "div"), shadow(&context, "b"), shadow(&context, "i"));

        context.insert_after(div, b, i).unwrap();
        assert_eq!(context.tree().child_nodes(div), vec![i, b]);

        let u = context.create_element("u");
        context.replace_child(div, u, i).unwrap();
        assert_eq!(context.tree().child_nodes(div), vec![u, b]);
        assert_eq!(context.tree().parent(i), None);
    }

    #[test]
    fn test_precondition_failures() {
        let mut doc = parse("<div contenteditable><b>x</b><i>y</i>|</div>").unwrap();
        let mut context = EditingContext::new(&mut doc, "test").unwrap();
        let (div, b, i) = (shadow(&context, "div"), shadow(&context, "b"), shadow(&context, "i"));
        let text = context.tree().first_child(b).unwrap();

        assert_eq!(
            context.insert_before(div, b, Some(b)),
            Err(EditError::SameNode(b))
        );
        assert_eq!(
            context.append_child(b, div),
            Err(EditError::HierarchyRequest { parent: b, child: div })
        );
        assert_eq!(
            context.remove_child(i, b),
            Err(EditError::NotAChild { parent: i, child: b })
        );
        assert_eq!(context.append_child(text, i), Err(EditError::NotElement(text)));
        assert_eq!(
            context.remove_attribute(b, "title"),
            Err(EditError::MissingAttribute { node: b, name: "title".to_string() })
        );
        assert_eq!(context.clone_node(b, true), Err(EditError::DeepCloneUnsupported));
        assert!(context.instructions().is_empty());
    }

    #[test]
    fn test_split_text_shares_source() {
        let mut doc = parse("<p contenteditable>abcdef|</p>").unwrap();
        let mut context = EditingContext::new(&mut doc, "test").unwrap();
        let p = shadow(&context, "p");
        let text = context.tree().first_child(p).unwrap();

        let suffix = context.split_text(text, 2).unwrap();
        let tail = context.split_text(suffix, 3).unwrap();

        let tree = context.tree();
        assert_eq!(tree.text(text).as_deref(), Some("ab"));
        assert_eq!(tree.text(suffix).as_deref(), Some("cde"));
        assert_eq!(tree.text(tail).as_deref(), Some("f"));
        assert_eq!(tree.split_offset(text), 2);
        assert_eq!(tree.split_offset(tail), -5);
        assert_eq!(tree.child_nodes(p), vec![text, suffix, tail]);

        assert_eq!(
            context.split_text(text, 2),
            Err(EditError::OffsetOutOfRange { node: text, offset: 2, length: 2 })
        );
        assert_eq!(
            context.split_text(text, 0),
            Err(EditError::OffsetOutOfRange { node: text, offset: 0, length: 2 })
        );
        let detached = context.create_text_node("xy");
        assert_eq!(context.split_text(detached, 1), Err(EditError::Detached(detached)));
        assert_eq!(context.split_text(p, 1), Err(EditError::NotText(p)));
    }

    #[test]
    fn test_clone_drops_identifier() {
        let mut doc = parse("<p contenteditable id=\"x\" class=\"c\">a|</p>").unwrap();
        let mut context = EditingContext::new(&mut doc, "test").unwrap();
        let p = shadow(&context, "p");

        let clone = context.clone_node(p, false).unwrap();
        let tree = context.tree();
        assert_eq!(tree.node_name(clone), "P");
        assert_eq!(tree.attribute(clone, "class"), Some("c"));
        assert_eq!(tree.attribute(clone, "id"), None);
        assert_eq!(tree.parent(clone), None);
        assert!(context.instructions().is_empty());
    }

    #[test]
    fn test_attributes_and_style() {
        let mut doc = parse("<p contenteditable title=\"a\">x|</p>").unwrap();
        let before = body_html(&doc);
        let operations = {
            let mut context = EditingContext::new(&mut doc, "test").unwrap();
            let p = shadow(&context, "p");
            context.set_attribute(p, "TITLE", "b").unwrap();
            context.set_style(p, "color", Some("red")).unwrap();
            assert_eq!(context.tree().attribute(p, "title"), Some("b"));
            assert_eq!(context.tree().attribute(p, "style"), Some("color: red"));

            context.set_style(p, "color", Some("")).unwrap();
            context.remove_attribute(p, "title").unwrap();
            assert!(!context.tree().has_attribute(p, "title"));
            context.instructions().to_vec()
        };
        assert_eq!(body_html(&doc), "<p contenteditable>x|</p>");

        undo_all(&mut doc, &operations);
        assert_eq!(body_html(&doc), before);
    }

    #[test]
    fn test_ending_selection_lifecycle() {
        let mut doc = parse("<p contenteditable>ab|</p>").unwrap();
        let mut context = EditingContext::new(&mut doc, "test").unwrap();
        let p = shadow(&context, "p");

        assert_eq!(context.ending_selection(), Err(EditError::MissingEndingSelection));
        assert_eq!(
            context.set_ending_selection(ReadOnlySelection::caret(p, 5)),
            Err(EditError::InvalidPosition { container: p, offset: 5 })
        );

        let starting = *context.starting_selection();
        context.set_ending_selection(starting).unwrap();
        assert!(context.is_finished());
        assert_eq!(
            context.set_ending_selection(starting),
            Err(EditError::EndingSelectionAlreadySet)
        );
        let b = context.create_element("b");
        assert_eq!(context.append_child(p, b), Err(EditError::ContextFinished));

        let record = context.into_record().unwrap();
        assert_eq!(record.name, "test");
        assert!(record.operations.is_empty());
    }

    #[test]
    fn test_rollback_then_record_restores_host_structure() {
        let mut doc = parse("<p contenteditable>ab|cd</p>").unwrap();
        let host_p = doc.query("p").unwrap();
        let original = doc.child_nodes(host_p);
        let record = {
            let mut context = EditingContext::new(&mut doc, "test").unwrap();
            let p = shadow(&context, "p");
            assert_eq!(context.instructions().len(), 1);

            let b = context.create_element("b");
            context.append_child(p, b).unwrap();
            context.set_attribute(b, "title", "t").unwrap();
            let first = context.tree().first_child(p).unwrap();
            context.remove_child(p, first).unwrap();

            context.rollback().unwrap();
            assert_eq!(context.instructions().len(), 1);
            assert_eq!(context.tree().child_count(p), 2);
            assert_eq!(context.tree().parent(b), None);
            let starting = *context.starting_selection();
            context.set_ending_selection(starting).unwrap();
            context.into_record().unwrap()
        };

        assert!(record.operations.is_empty());
        assert_eq!(doc.child_nodes(host_p), original);
        assert_eq!(doc.text(original[0]).as_deref(), Some("abcd"));
        assert_eq!(record.ending_selection.to_host(), doc.selection());
        assert_eq!(body_html(&doc), "<p contenteditable>ab|cd</p>");
    }

    #[test]
    fn test_record_keeps_normalization_when_selection_moves() {
        let mut doc = parse("<p contenteditable>ab|cd</p>").unwrap();
        let host_p = doc.query("p").unwrap();
        let record = {
            let mut context = EditingContext::new(&mut doc, "test").unwrap();
            let p = shadow(&context, "p");
            context.set_ending_selection(ReadOnlySelection::caret(p, 0)).unwrap();
            context.into_record().unwrap()
        };

        assert_eq!(record.operations.len(), 1);
        assert_eq!(doc.child_nodes(host_p).len(), 2);
        record.undo(&mut doc).unwrap();
        assert_eq!(doc.child_nodes(host_p).len(), 1);
    }
}
