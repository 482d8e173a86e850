use std::fmt;

use tracing::{debug, warn};

use super::command::UndoCommand;
use crate::observer::{ListenerId, Observers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    IndexChanged { index: usize },
    CleanChanged { clean: bool },
}

/// Linear undo/redo history.
///
/// `index` counts the commands currently applied. Commands past `index`
/// are the redo tail and are discarded by the next push. The clean index
/// marks the saved state; `None` means that state can no longer be
/// reached.
pub struct UndoStack<T: ?Sized> {
    commands: Vec<Box<dyn UndoCommand<T>>>,
    index: usize,
    clean_index: Option<usize>,
    /// Maximum number of commands kept, 0 for unlimited
    limit: usize,
    observers: Observers<StackEvent>,
}

impl<T: ?Sized> fmt::Debug for UndoStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStack")
            .field("len", &self.commands.len())
            .field("index", &self.index)
            .field("clean_index", &self.clean_index)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<T: ?Sized> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> UndoStack<T> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: 0,
            clean_index: Some(0),
            limit: 0,
            observers: Observers::new(),
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        let mut stack = Self::new();
        stack.limit = limit;
        stack
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StackEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn clean_index(&self) -> Option<usize> {
        self.clean_index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit. Commands over the new limit are dropped oldest
    /// first, as long as they are applied.
    pub fn set_limit(&mut self, limit: usize) {
        let was_clean = self.is_clean();
        let old_index = self.index;
        self.limit = limit;
        self.enforce_limit();
        self.notify(old_index, was_clean);
    }

    /// Push and execute `command`. Returns `false` when the command is
    /// invalid and was not recorded.
    pub fn push(&mut self, target: &mut T, mut command: Box<dyn UndoCommand<T>>) -> bool {
        if !command.is_valid() {
            warn!(text = %command.text(), "refusing to push an invalid command");
            return false;
        }
        command.redo(target);
        self.record(command);
        true
    }

    /// Record a command whose effect was already applied while it was built
    pub fn push_done(&mut self, command: Box<dyn UndoCommand<T>>) -> bool {
        if !command.is_valid() {
            warn!(text = %command.text(), "refusing to record an invalid command");
            return false;
        }
        self.record(command);
        true
    }

    fn record(&mut self, command: Box<dyn UndoCommand<T>>) {
        let was_clean = self.is_clean();
        let old_index = self.index;

        if self.index < self.commands.len() {
            self.commands.truncate(self.index);
            if matches!(self.clean_index, Some(clean) if clean > self.index) {
                self.clean_index = None;
            }
        }
        debug!(text = %command.text(), index = self.index, "command recorded");
        self.commands.push(command);
        self.index = self.commands.len();
        self.enforce_limit();

        self.notify(old_index, was_clean);
    }

    fn enforce_limit(&mut self) {
        if self.limit == 0 {
            return;
        }
        while self.commands.len() > self.limit && self.index > 0 {
            self.commands.remove(0);
            self.index -= 1;
            self.clean_index = self.clean_index.and_then(|c| c.checked_sub(1));
        }
    }

    /// Revert the last applied command. Returns `false` at the bottom.
    pub fn undo(&mut self, target: &mut T) -> bool {
        if self.index == 0 {
            return false;
        }
        let was_clean = self.is_clean();
        self.index -= 1;
        let command = &mut self.commands[self.index];
        debug!(text = %command.text(), "undo");
        command.undo(target);
        self.notify(self.index + 1, was_clean);
        true
    }

    /// Reapply the next undone command. Returns `false` at the top.
    pub fn redo(&mut self, target: &mut T) -> bool {
        if self.index == self.commands.len() {
            return false;
        }
        let was_clean = self.is_clean();
        let command = &mut self.commands[self.index];
        debug!(text = %command.text(), "redo");
        command.redo(target);
        self.index += 1;
        self.notify(self.index - 1, was_clean);
        true
    }

    /// Undo or redo one step at a time until `index` is reached. The target
    /// is clamped to the history.
    pub fn set_index(&mut self, target: &mut T, index: usize) {
        let index = index.min(self.commands.len());
        while self.index > index {
            self.undo(target);
        }
        while self.index < index {
            self.redo(target);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.index)
    }

    /// Mark the current state as the saved one
    pub fn set_clean(&mut self) {
        let was_clean = self.is_clean();
        self.clean_index = Some(self.index);
        self.notify(self.index, was_clean);
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    pub fn undo_text(&self) -> Option<String> {
        self.index.checked_sub(1).map(|i| self.commands[i].text())
    }

    pub fn redo_text(&self) -> Option<String> {
        self.commands.get(self.index).map(|c| c.text())
    }

    /// Label of the command at `i`
    pub fn text(&self, i: usize) -> Option<String> {
        self.commands.get(i).map(|c| c.text())
    }

    /// Forget every command. The current state becomes clean.
    pub fn clear(&mut self) {
        let was_clean = self.is_clean();
        let old_index = self.index;
        self.commands.clear();
        self.index = 0;
        self.clean_index = Some(0);
        self.notify(old_index, was_clean);
    }

    fn notify(&mut self, old_index: usize, was_clean: bool) {
        if self.index != old_index {
            self.observers.emit(&StackEvent::IndexChanged { index: self.index });
        }
        let clean = self.is_clean();
        if clean != was_clean {
            self.observers.emit(&StackEvent::CleanChanged { clean });
        }
    }
}
