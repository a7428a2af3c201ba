//! Command registry.
//!
//! Names are case-insensitive. `backcolor` is stored under `hilitecolor`.

use crate::context::EditingContext;
use crate::errors::EditError;
use std::collections::BTreeMap;
use std::fmt;

/// A command mutates through the context and must set its ending selection.
/// `Ok(false)` means there was nothing to do.
pub type CommandFn = fn(&mut EditingContext<'_>, bool, &str) -> Result<bool, EditError>;

#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandFn>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.commands.keys()).finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command` under `name`, replacing an earlier registration.
    pub fn register(&mut self, name: &str, command: CommandFn) -> &mut Self {
        self.commands.insert(canonical_name(name), command);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<CommandFn> {
        self.commands.get(&canonical_name(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&canonical_name(name))
    }

    /// Canonical names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

pub fn canonical_name(name: &str) -> String {
    let name = name.to_ascii_lowercase();
    if name == "backcolor" {
        return "hilitecolor".to_string();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ReadOnlySelection;
    use inkstone_dom::fixture::parse;

    fn noop(context: &mut EditingContext<'_>, _user_interface: bool, _value: &str) -> Result<bool, EditError> {
        let starting = *context.starting_selection();
        context.set_ending_selection(starting)?;
        Ok(false)
    }

    fn highlight(context: &mut EditingContext<'_>, _user_interface: bool, _value: &str) -> Result<bool, EditError> {
        context.set_ending_selection(ReadOnlySelection::empty())?;
        Ok(true)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = CommandRegistry::new();
        registry.register("createLink", noop).register("hiliteColor", highlight);

        assert!(registry.contains("CREATELINK"));
        assert!(registry.lookup("backColor").is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["createlink", "hilitecolor"]);
        assert!(registry.lookup("bold").is_none());
    }

    #[test]
    fn test_context_exec_command() {
        let mut registry = CommandRegistry::new();
        registry.register("noop", noop).register("hilitecolor", highlight);
        let mut doc = parse("<p contenteditable>a|</p>").unwrap();

        let mut context = EditingContext::new(&mut doc, "backcolor").unwrap();
        assert_eq!(
            context.exec_command(&registry, "bold", false, ""),
            Err(EditError::UnknownCommand("bold".to_string()))
        );
        assert_eq!(context.exec_command(&registry, "BackColor", false, "red"), Ok(true));
        assert!(context.ending_selection().unwrap().is_empty());
    }
}
