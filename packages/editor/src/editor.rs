//! # Editor
//!
//! Long-lived service: owns the command registry, the configuration and the
//! undo history. Each `exec_command` call builds a fresh editing context
//! over the host document, runs the command, applies the ending selection
//! to the host and stores the resulting record.

use crate::config::EditorConfig;
use crate::context::EditingContext;
use crate::errors::EditError;
use crate::registry::CommandRegistry;
use crate::undo_stack::UndoStack;
use inkstone_dom::HostDocument;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct Editor {
    registry: CommandRegistry,
    config: EditorConfig,
    history: UndoStack,
}

impl Editor {
    pub fn new(registry: CommandRegistry) -> Self {
        Self::with_config(registry, EditorConfig::default())
    }

    pub fn with_config(registry: CommandRegistry, config: EditorConfig) -> Self {
        Self {
            history: UndoStack::with_max_levels(config.max_undo_levels),
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Runs command `name` against `host`.
    ///
    /// Returns the command's own result. A command that changed nothing
    /// leaves no undo record.
    #[instrument(skip(self, host, value))]
    pub fn exec_command(
        &mut self,
        host: &mut dyn HostDocument,
        name: &str,
        user_interface: bool,
        value: &str,
    ) -> Result<bool, EditError> {
        if !self.registry.contains(name) {
            warn!(command = name, "Unknown command");
            return Err(EditError::UnknownCommand(name.to_string()));
        }
        info!(command = name, "Executing command");

        let mut context = EditingContext::with_config(host, name, &self.config)?;
        let executed = match context.exec_command(&self.registry, name, user_interface, value) {
            Ok(executed) => executed,
            Err(err) => {
                warn!(command = name, error = %err, "Command failed");
                return Err(err);
            }
        };
        let record = context.into_record()?;

        host.set_selection(record.ending_selection.to_host());
        info!(
            command = name,
            executed,
            operations = record.operations.len(),
            "Command finished"
        );
        if !record.operations.is_empty() {
            self.history.push(record);
        }
        Ok(executed)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the last command and restores the selection it started from.
    /// Returns `false` when there is nothing to undo.
    #[instrument(skip(self, host))]
    pub fn undo(&mut self, host: &mut dyn HostDocument) -> Result<bool, EditError> {
        let Some(record) = self.history.undo(host)? else {
            return Ok(false);
        };
        info!(command = %record.name, "Undid command");
        host.set_selection(record.starting_selection.to_host());
        Ok(true)
    }

    /// Reapplies the last undone command and its ending selection.
    #[instrument(skip(self, host))]
    pub fn redo(&mut self, host: &mut dyn HostDocument) -> Result<bool, EditError> {
        let Some(record) = self.history.redo(host)? else {
            return Ok(false);
        };
        info!(command = %record.name, "Redid command");
        host.set_selection(record.ending_selection.to_host());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ReadOnlySelection;
    use inkstone_dom::fixture::parse;
    use inkstone_dom::serialize::body_html;

    /// Inserts `<a>{value}</a>` at the caret and leaves the caret after it.
    fn insert_link(context: &mut EditingContext<'_>, _user_interface: bool, value: &str) -> Result<bool, EditError> {
        let Some(focus) = context.selection().focus() else {
            let starting = *context.starting_selection();
            context.set_ending_selection(starting)?;
            return Ok(false);
        };
        let container = focus.container();
        let reference = focus.node_after(context.tree());

        let link = context.create_element("a");
        let text = context.create_text_node(value);
        context.append_child(link, text)?;
        context.insert_before(container, link, reference)?;

        let offset = context.tree().node_index(link) + 1;
        context.set_ending_selection(ReadOnlySelection::caret(container, offset))?;
        Ok(true)
    }

    fn forget_selection(_context: &mut EditingContext<'_>, _user_interface: bool, _value: &str) -> Result<bool, EditError> {
        Ok(true)
    }

    fn editor() -> Editor {
        let mut registry = CommandRegistry::new();
        registry
            .register("insertLink", insert_link)
            .register("forget", forget_selection);
        Editor::new(registry)
    }

    #[test]
    fn test_insert_at_caret_and_undo() {
        let mut doc = parse("<p contenteditable>ab|cd</p>").unwrap();
        let mut editor = editor();

        assert!(editor.exec_command(&mut doc, "insertLink", false, "URL").unwrap());
        assert_eq!(body_html(&doc), "<p contenteditable>ab<a>URL</a>|cd</p>");
        assert_eq!(editor.history().undo_description(), Some("insertLink"));

        assert!(editor.undo(&mut doc).unwrap());
        assert_eq!(body_html(&doc), "<p contenteditable>ab|cd</p>");
        let p = doc.query("p").unwrap();
        assert_eq!(doc.child_nodes(p).len(), 1);

        assert!(editor.redo(&mut doc).unwrap());
        assert_eq!(body_html(&doc), "<p contenteditable>ab<a>URL</a>|cd</p>");
        assert!(!editor.redo(&mut doc).unwrap());
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let mut doc = parse("<p contenteditable>ab|cd</p>").unwrap();
        let mut editor = editor();

        assert_eq!(
            editor.exec_command(&mut doc, "bold", false, ""),
            Err(EditError::UnknownCommand("bold".to_string()))
        );
        assert_eq!(body_html(&doc), "<p contenteditable>ab|cd</p>");
    }

    #[test]
    fn test_missing_ending_selection() {
        let mut doc = parse("<p contenteditable>ab|</p>").unwrap();
        let mut editor = editor();

        assert_eq!(
            editor.exec_command(&mut doc, "forget", false, ""),
            Err(EditError::MissingEndingSelection)
        );
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_config_limits_history() {
        let config = EditorConfig::from_json(r#"{ "max_undo_levels": 1 }"#).unwrap();
        let mut registry = CommandRegistry::new();
        registry.register("insertLink", insert_link);
        let mut editor = Editor::with_config(registry, config);
        let mut doc = parse("<p contenteditable>ab|cd</p>").unwrap();

        editor.exec_command(&mut doc, "insertLink", false, "1").unwrap();
        editor.exec_command(&mut doc, "insertLink", false, "2").unwrap();
        assert_eq!(body_html(&doc), "<p contenteditable>ab<a>1</a><a>2</a>|cd</p>");
        assert_eq!(editor.history().undo_levels(), 1);

        editor.undo(&mut doc).unwrap();
        assert_eq!(body_html(&doc), "<p contenteditable>ab<a>1</a>|cd</p>");
        assert!(!editor.undo(&mut doc).unwrap());
    }
}
