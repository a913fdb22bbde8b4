//! Command manager: runs commands and walks the history

use tracing::{debug, info, warn};

use crate::commands::Command;
use crate::error::{CommandError, SessionError};
use crate::executors::{ExecOp, Executor, ExecutorRegistry};
use crate::history::CommandList;
use crate::persistence::{session_to_json, SessionFile};
use crate::state::EditorState;

/// Owns the history and the executor registry.
#[derive(Debug)]
pub struct CommandManager {
    registry: ExecutorRegistry,
    history: CommandList,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(ExecutorRegistry::with_default_executors(), None)
    }
}

impl CommandManager {
    pub fn new(registry: ExecutorRegistry, max_commands: Option<usize>) -> Self {
        Self {
            registry,
            history: CommandList::new(max_commands),
        }
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ExecutorRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &CommandList {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandList {
        &mut self.history
    }

    fn executor(&self, type_name: &str) -> Result<&dyn Executor, CommandError> {
        self.registry
            .get(type_name)
            .ok_or_else(|| CommandError::NoExecutor(type_name.to_string()))
    }

    /// Construction validity plus applicability to the current state.
    pub fn check(&self, command: &Command, state: &EditorState) -> Result<(), CommandError> {
        let invalid = |reason: String| CommandError::Invalid {
            type_name: command.type_name().to_string(),
            reason,
        };
        command.validate().map_err(invalid)?;
        self.executor(command.type_name())?
            .check(command, state)
            .map_err(invalid)
    }

    /// Check the command and capture the selection the first time it runs.
    fn begin(&self, command: &mut Command, state: &EditorState) -> Result<&dyn Executor, CommandError> {
        let executor = self.executor(command.type_name())?;
        if command.selection().is_none() {
            if let Err(e) = self.check(command, state) {
                warn!("rejected {}: {e}", command.type_name());
                return Err(e);
            }
            command.set_selection(state.selection.selection().clone());
        }
        Ok(executor)
    }

    /// Apply a command that is still being edited, e.g. during a drag.
    /// May be called any number of times before `commit` or `cancel`.
    pub fn preview(&self, command: &mut Command, state: &mut EditorState) -> Result<(), CommandError> {
        assert!(!command.is_finalized(), "cannot preview a committed command");
        let executor = self.begin(command, state)?;
        rewind_preview(executor, command, state);
        executor.execute(command, ExecOp::Do, state);
        Ok(())
    }

    /// Finalize a command, apply it, and append it to the history.
    pub fn add_and_do(&mut self, mut command: Command, state: &mut EditorState) -> Result<(), CommandError> {
        let executor = self.begin(&mut command, state)?;
        rewind_preview(executor, &mut command, state);
        command.set_finalized(true);
        executor.execute(&mut command, ExecOp::Do, state);
        debug!(command = command.type_name(), "{}", command.description());
        self.history.push(command);
        Ok(())
    }

    /// Same as [`CommandManager::add_and_do`]; ends a preview.
    pub fn commit(&mut self, command: Command, state: &mut EditorState) -> Result<(), CommandError> {
        self.add_and_do(command, state)
    }

    /// Revert a previewed command and drop it.
    pub fn cancel(&self, mut command: Command, state: &mut EditorState) -> Result<(), CommandError> {
        assert!(!command.is_finalized(), "cannot cancel a committed command");
        if command.has_exec_data() {
            self.executor(command.type_name())?
                .execute(&mut command, ExecOp::Undo, state);
        }
        debug!(command = command.type_name(), "cancelled");
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back over the last done command.
    pub fn undo(&mut self, state: &mut EditorState) -> Result<(), CommandError> {
        let command = self
            .history
            .undo_target()
            .ok_or(CommandError::NothingToUndo)?;
        if command.has_undo_effect() {
            let executor = self
                .registry
                .get(command.type_name())
                .ok_or_else(|| CommandError::NoExecutor(command.type_name().to_string()))?;
            executor.execute(command, ExecOp::Undo, state);
        }
        debug!(command = command.type_name(), "undo");
        self.history.step_back();
        Ok(())
    }

    /// Step forward over the next undone command.
    pub fn redo(&mut self, state: &mut EditorState) -> Result<(), CommandError> {
        let command = self
            .history
            .redo_target()
            .ok_or(CommandError::NothingToRedo)?;
        if command.has_redo_effect() {
            let executor = self
                .registry
                .get(command.type_name())
                .ok_or_else(|| CommandError::NoExecutor(command.type_name().to_string()))?;
            executor.execute(command, ExecOp::Do, state);
        }
        debug!(command = command.type_name(), "redo");
        self.history.step_forward();
        Ok(())
    }

    /// Undo or redo until `index` commands are done.
    pub fn move_to(&mut self, index: usize, state: &mut EditorState) -> Result<(), CommandError> {
        while self.history.current_index() > index {
            self.undo(state)?;
        }
        while self.history.current_index() < index {
            self.redo(state)?;
        }
        Ok(())
    }

    // ── Replay and sessions ───────────────────────────────────

    /// Run a command and, before it, its orphans, without touching the
    /// selection.
    fn replay_command(&self, command: &mut Command, state: &mut EditorState) -> Result<(), CommandError> {
        for orphan in command.orphaned_commands_mut().iter_mut() {
            self.replay_command(orphan, state)?;
        }
        let executor = self.begin(command, state)?;
        command.set_validating(true);
        command.set_finalized(true);
        executor.execute(command, ExecOp::Do, state);
        command.set_validating(false);
        Ok(())
    }

    /// Run persisted commands in order and append them to the history.
    pub fn replay(&mut self, commands: Vec<Command>, state: &mut EditorState) -> Result<(), SessionError> {
        info!(count = commands.len(), "replaying commands");
        for (index, mut command) in commands.into_iter().enumerate() {
            self.replay_command(&mut command, state)
                .map_err(|e| match e {
                    CommandError::Invalid { type_name, reason } => SessionError::InvalidCommand {
                        index,
                        type_name,
                        reason,
                    },
                    other => SessionError::Command(other),
                })?;
            self.history.push(command);
        }
        // Statuses were never driven during replay.
        state.deselect_all();
        Ok(())
    }

    /// The whole history as session JSON, evicted commands included.
    pub fn export_session(&self) -> Result<String, SessionError> {
        session_to_json(self.history.session_commands(), self.history.session_index())
    }

    /// Replace the document with a saved session.
    ///
    /// The session replays into an empty document. If any command fails,
    /// the previous document and history come back untouched.
    pub fn load_session(&mut self, json: &str, state: &mut EditorState) -> Result<(), SessionError> {
        let file = SessionFile::from_json(json)?;
        info!(
            commands = file.commands.len(),
            current = file.current_index,
            "loading session"
        );
        let max_commands = self.history.max_commands();
        let previous_history = std::mem::replace(&mut self.history, CommandList::new(None));
        let previous_document = state.take_document();

        let current_index = file.current_index;
        let loaded = self.replay(file.commands, state).and_then(|()| {
            self.move_to(current_index, state)
                .map_err(SessionError::from)
        });
        if let Err(e) = loaded {
            warn!("session rejected, keeping the current document: {e}");
            self.history = previous_history;
            state.restore_document(previous_document);
            return Err(e);
        }
        // Applied after the cursor moved so undone commands stay reachable.
        self.history.set_max_commands(max_commands);
        self.history.mark_saved();
        Ok(())
    }

    /// Drop the history and the document.
    pub fn clear(&mut self, state: &mut EditorState) {
        self.history.clear();
        state.reset();
    }
}

/// Take back an earlier preview so the next `Do` starts from the state the
/// command was checked against.
fn rewind_preview(executor: &dyn Executor, command: &mut Command, state: &mut EditorState) {
    if command.has_exec_data() && !command.is_finalized() {
        executor.execute(command, ExecOp::Undo, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        ChangeColorCommand, CopyCommand, CreatePrimitiveModelCommand, DeleteCommand,
        TranslateCommand,
    };
    use glam::Vec3;
    use shared::{Color, PrimitiveType};

    fn create(primitive_type: PrimitiveType) -> Command {
        Command::from(CreatePrimitiveModelCommand {
            primitive_type,
            ..Default::default()
        })
    }

    #[test]
    fn test_add_undo_redo() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        assert!(!mgr.can_undo());
        mgr.add_and_do(create(PrimitiveType::Box), &mut state).unwrap();
        assert!(mgr.can_undo());
        assert_eq!(state.scene.attached_count(), 1);

        mgr.undo(&mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 0);
        assert!(mgr.can_redo());
        mgr.redo(&mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 1);
        assert!(matches!(mgr.redo(&mut state), Err(CommandError::NothingToRedo)));
    }

    #[test]
    fn test_invalid_command_never_reaches_history() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        let bad = Command::from(ChangeColorCommand {
            model_names: vec!["Nope".into()],
            new_color: Color::new(1.0, 0.0, 0.0),
        });
        let err = mgr.add_and_do(bad, &mut state).unwrap_err();
        assert_eq!(err.to_string(), "invalid ChangeColorCommand: No model named Nope");
        assert!(mgr.history().is_empty());
    }

    #[test]
    fn test_missing_executor() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::new(ExecutorRegistry::new(), None);
        let err = mgr.add_and_do(create(PrimitiveType::Box), &mut state).unwrap_err();
        assert!(matches!(err, CommandError::NoExecutor(name) if name == "CreatePrimitiveModelCommand"));
    }

    #[test]
    fn test_preview_then_cancel_restores() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        mgr.add_and_do(create(PrimitiveType::Sphere), &mut state).unwrap();
        let id = state.scene.expect_path("Sphere_1").model();

        let mut drag = Command::from(TranslateCommand {
            model_names: vec!["Sphere_1".into()],
            translation: Vec3::X,
        });
        mgr.preview(&mut drag, &mut state).unwrap();
        drag.payload_mut::<TranslateCommand>().translation = Vec3::new(3.0, 0.0, 0.0);
        mgr.preview(&mut drag, &mut state).unwrap();
        assert_eq!(state.scene.model(id).transform.translation, Vec3::new(3.0, 0.0, 0.0));

        mgr.cancel(drag, &mut state).unwrap();
        assert_eq!(state.scene.model(id).transform.translation, Vec3::ZERO);
        assert_eq!(mgr.history().len(), 1);
    }

    #[test]
    fn test_commit_after_preview_creates_once() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        let mut create_box = create(PrimitiveType::Box);
        mgr.preview(&mut create_box, &mut state).unwrap();
        mgr.preview(&mut create_box, &mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 1);

        mgr.commit(create_box, &mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 1);
        assert_eq!(state.selected_names(), vec!["Box_1"]);

        mgr.undo(&mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 0);
        mgr.redo(&mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 1);
    }

    #[test]
    fn test_commit_after_preview_deletes_once() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        mgr.add_and_do(create(PrimitiveType::Box), &mut state).unwrap();
        mgr.add_and_do(create(PrimitiveType::Sphere), &mut state).unwrap();
        let box_id = state.scene.expect_path("Box_1").model();

        let mut delete = Command::from(DeleteCommand {
            model_names: vec!["Box_1".into()],
        });
        mgr.preview(&mut delete, &mut state).unwrap();
        mgr.commit(delete, &mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 1);
        assert!(state.scene.find_path("Box_1").is_none());
        assert!(state.scene.find_path("Sphere_1").is_some());

        mgr.undo(&mut state).unwrap();
        let root = state.scene.root();
        assert_eq!(state.scene.model(root).children()[0], box_id);
    }

    #[test]
    fn test_commit_keeps_last_previewed_value() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        mgr.add_and_do(create(PrimitiveType::Box), &mut state).unwrap();
        let id = state.scene.expect_path("Box_1").model();

        let mut drag = Command::from(TranslateCommand {
            model_names: vec!["Box_1".into()],
            translation: Vec3::X,
        });
        mgr.preview(&mut drag, &mut state).unwrap();
        drag.payload_mut::<TranslateCommand>().translation = Vec3::new(0.0, 4.0, 0.0);
        mgr.commit(drag, &mut state).unwrap();
        assert_eq!(state.scene.model(id).transform.translation, Vec3::new(0.0, 4.0, 0.0));

        mgr.undo(&mut state).unwrap();
        assert_eq!(state.scene.model(id).transform.translation, Vec3::ZERO);
        mgr.redo(&mut state).unwrap();
        assert_eq!(state.scene.model(id).transform.translation, Vec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn test_failed_load_keeps_document_and_history() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        mgr.add_and_do(create(PrimitiveType::Torus), &mut state).unwrap();

        let json = crate::fixtures::session_of([
            create(PrimitiveType::Box).kind().clone(),
            DeleteCommand {
                model_names: vec!["Nope".into()],
            }
            .into(),
        ]);
        let err = mgr.load_session(&json, &mut state).unwrap_err();
        assert!(matches!(err, SessionError::InvalidCommand { index: 1, .. }));
        assert_eq!(state.scene.attached_count(), 1);
        assert!(state.scene.find_path("Torus_1").is_some());
        assert_eq!(state.selected_names(), vec!["Torus_1"]);
        assert_eq!(mgr.history().len(), 1);

        mgr.undo(&mut state).unwrap();
        assert_eq!(state.scene.attached_count(), 0);
    }

    #[test]
    fn test_undo_steps_over_copy_without_executing() {
        let mut state = EditorState::default();
        let mut mgr = CommandManager::default();
        mgr.add_and_do(create(PrimitiveType::Box), &mut state).unwrap();
        mgr.add_and_do(
            Command::from(CopyCommand::new(vec!["Box_1".into()])),
            &mut state,
        )
        .unwrap();
        mgr.undo(&mut state).unwrap();
        assert_eq!(mgr.history().current_index(), 1);
        assert_eq!(state.scene.attached_count(), 1);
        assert_eq!(state.clipboard.model_count(), 1);
    }
}
