//! # Undo/Redo Stack
//!
//! Command-level history. Each successful command leaves one
//! [`CommandRecord`]; undoing replays its operations backwards, redoing
//! replays them forwards.
//!
//! ## Design
//!
//! - A record keeps the host selection before and after the command
//! - Undo moves the record to the redo stack, redo moves it back
//! - New records clear the redo stack
//! - The oldest record is dropped once `max_levels` is exceeded
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.push(context.into_record()?);
//!
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use crate::operations::Operation;
use crate::selection::ReadOnlySelection;
use inkstone_dom::{HostDocument, HostError, HostNodeId};
use serde::{Deserialize, Serialize};

/// Everything one command execution did, in host terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub name: String,
    pub starting_selection: ReadOnlySelection<HostNodeId>,
    pub ending_selection: ReadOnlySelection<HostNodeId>,
    pub operations: Vec<Operation>,
}

impl CommandRecord {
    /// Reverts the operations, newest first.
    pub fn undo(&self, host: &mut dyn HostDocument) -> Result<(), HostError> {
        for operation in self.operations.iter().rev() {
            operation.undo(host)?;
        }
        Ok(())
    }

    /// Reapplies the operations in their original order.
    pub fn redo(&self, host: &mut dyn HostDocument) -> Result<(), HostError> {
        for operation in &self.operations {
            operation.redo(host)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Applied records (most recent last)
    undo_stack: Vec<CommandRecord>,

    /// Undone records (most recent last)
    redo_stack: Vec<CommandRecord>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a command that has already been applied to the host
    pub fn push(&mut self, record: CommandRecord) {
        self.undo_stack.push(record);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new action invalidates the undone future
        self.redo_stack.clear();
    }

    /// Undo the most recent record. Returns it, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, host: &mut dyn HostDocument) -> Result<Option<&CommandRecord>, HostError> {
        let Some(record) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = record.undo(host) {
            self.undo_stack.push(record);
            return Err(err);
        }
        self.redo_stack.push(record);
        Ok(self.redo_stack.last())
    }

    /// Redo the most recently undone record.
    pub fn redo(&mut self, host: &mut dyn HostDocument) -> Result<Option<&CommandRecord>, HostError> {
        let Some(record) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = record.redo(host) {
            self.redo_stack.push(record);
            return Err(err);
        }
        self.undo_stack.push(record);
        Ok(self.undo_stack.last())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Command name of the next undo
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|record| record.name.as_str())
    }

    /// Command name of the next redo
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|record| record.name.as_str())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
