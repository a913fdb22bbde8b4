//! Linear command history with a cursor

use tracing::debug;

use crate::commands::Command;

/// Done commands sit before the cursor, undone ones after it.
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<Command>,
    current: usize,
    max_commands: Option<usize>,
    /// Evicted commands, without exec data, so exports still replay from
    /// an empty scene.
    archived: Vec<Command>,
    /// Cursor at the last save, `None` once that state is unreachable.
    saved_index: Option<usize>,
}

impl CommandList {
    pub fn new(max_commands: Option<usize>) -> Self {
        Self {
            commands: Vec::new(),
            current: 0,
            max_commands,
            archived: Vec::new(),
            saved_index: Some(0),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of done commands.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn max_commands(&self) -> Option<usize> {
        self.max_commands
    }

    /// Change the limit, evicting done commands beyond it.
    pub fn set_max_commands(&mut self, max_commands: Option<usize>) {
        self.max_commands = max_commands;
        self.evict();
    }

    /// Commands evicted from the window. They can no longer be undone.
    pub fn archived(&self) -> &[Command] {
        &self.archived
    }

    /// Every command a session file stores, archived ones first.
    pub fn session_commands(&self) -> impl Iterator<Item = &Command> {
        self.archived.iter().chain(&self.commands)
    }

    /// Cursor counted over [`CommandList::session_commands`].
    pub fn session_index(&self) -> usize {
        self.archived.len() + self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current < self.commands.len()
    }

    /// Last done command.
    pub(crate) fn undo_target(&mut self) -> Option<&mut Command> {
        let index = self.current.checked_sub(1)?;
        self.commands.get_mut(index)
    }

    /// First undone command.
    pub(crate) fn redo_target(&mut self) -> Option<&mut Command> {
        self.commands.get_mut(self.current)
    }

    pub(crate) fn step_back(&mut self) {
        assert!(self.can_undo(), "history cursor is already at the start");
        self.current -= 1;
    }

    pub(crate) fn step_forward(&mut self) {
        assert!(self.can_redo(), "history cursor is already at the end");
        self.current += 1;
    }

    /// Append a done command, discarding the redo tail.
    ///
    /// Orphan-able commands in the discarded tail, and the orphans they
    /// already carried, move to the new command in their original order.
    pub fn push(&mut self, mut command: Command) {
        let tail = self.commands.split_off(self.current);
        if !tail.is_empty() {
            let orphans = collect_orphans(tail);
            if !orphans.is_empty() {
                debug!(
                    count = orphans.len(),
                    owner = command.type_name(),
                    "adopting orphaned commands"
                );
                command.add_orphaned_commands(orphans);
            }
            if self.saved_index.is_some_and(|saved| saved > self.current) {
                self.saved_index = None;
            }
        }
        self.commands.push(command);
        self.current += 1;
        self.evict();
    }

    /// Drop the oldest done commands beyond the limit.
    fn evict(&mut self) {
        let Some(max) = self.max_commands else {
            return;
        };
        while self.commands.len() > max && self.current > 0 {
            let evicted = self.commands.remove(0);
            debug!(command = evicted.type_name(), "evicted from history");
            self.archived.push(evicted.into_persisted());
            self.current -= 1;
            self.saved_index = match self.saved_index {
                Some(0) | None => None,
                Some(saved) => Some(saved - 1),
            };
        }
    }

    pub fn mark_saved(&mut self) {
        self.saved_index = Some(self.current);
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saved_index != Some(self.current)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.archived.clear();
        self.current = 0;
        self.saved_index = Some(0);
    }
}

/// Orphans of the discarded commands, each command's own orphans first.
fn collect_orphans(tail: Vec<Command>) -> Vec<Command> {
    let mut orphans = Vec::new();
    for mut command in tail {
        orphans.append(command.orphaned_commands_mut());
        if command.should_be_added_as_orphan() {
            orphans.push(Command::new(command.kind().clone()));
        }
    }
    orphans
}
