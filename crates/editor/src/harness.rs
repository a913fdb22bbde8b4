//! Headless editor harness.
//!
//! Wires the editor state, the command manager and the action manager
//! together the way an interactive front end would, so scenarios can be
//! scripted from tests, the CLI and the JSON request protocol.

use serde_json::{json, Value};
use shared::PrimitiveType;
use tracing::error;

use crate::actions::{Action, ActionManager};
use crate::commands::{Command, CreatePrimitiveModelCommand};
use crate::error::{CommandError, SessionError};
use crate::executors::ExecutorRegistry;
use crate::manager::CommandManager;
use crate::state::{
    Direction, EditorSettings, EditorState, Model, ModelId, ModelLoader, ModelStatus, Selection,
};

/// Editor driven without a UI.
pub struct Harness {
    pub state: EditorState,
    pub commands: CommandManager,
    pub actions: ActionManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    /// Harness whose history limit comes from `settings`.
    pub fn with_settings(settings: EditorSettings) -> Self {
        let max_commands = settings.history.max_commands;
        let mut harness = Self {
            state: EditorState::new(settings),
            commands: CommandManager::new(ExecutorRegistry::with_default_executors(), max_commands),
            actions: ActionManager::new(),
        };
        harness.refresh();
        harness
    }

    pub fn with_loader(mut self, loader: impl ModelLoader + 'static) -> Self {
        self.state = std::mem::take(&mut self.state).with_loader(loader);
        self
    }

    fn refresh(&mut self) {
        self.actions.refresh(&self.state, &self.commands);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Run a command and add it to the history.
    pub fn execute(&mut self, command: impl Into<Command>) -> Result<(), CommandError> {
        let result = self.commands.add_and_do(command.into(), &mut self.state);
        self.refresh();
        result
    }

    /// Create a primitive with a generated name and return that name.
    pub fn create_primitive(&mut self, primitive_type: PrimitiveType) -> String {
        self.execute(CreatePrimitiveModelCommand {
            primitive_type,
            ..Default::default()
        })
        .unwrap_or_else(|e| panic!("creating a primitive cannot fail: {e}"));
        self.last_command()
            .payload::<CreatePrimitiveModelCommand>()
            .result_name
            .clone()
    }

    pub fn create_box(&mut self) -> String {
        self.create_primitive(PrimitiveType::Box)
    }

    /// Last command in the history, done or not.
    pub fn last_command(&self) -> &Command {
        self.commands
            .history()
            .commands()
            .last()
            .unwrap_or_else(|| panic!("history is empty"))
    }

    pub fn preview(&mut self, command: &mut Command) -> Result<(), CommandError> {
        let result = self.commands.preview(command, &mut self.state);
        self.refresh();
        result
    }

    pub fn commit(&mut self, command: Command) -> Result<(), CommandError> {
        let result = self.commands.commit(command, &mut self.state);
        self.refresh();
        result
    }

    pub fn cancel(&mut self, command: Command) -> Result<(), CommandError> {
        let result = self.commands.cancel(command, &mut self.state);
        self.refresh();
        result
    }

    /// Undo the last command. `Ok(false)` when there is nothing to undo.
    pub fn try_undo(&mut self) -> Result<bool, CommandError> {
        let result = self.commands.undo(&mut self.state);
        self.refresh();
        stepped(result)
    }

    /// Redo the next command. `Ok(false)` when there is nothing to redo.
    pub fn try_redo(&mut self) -> Result<bool, CommandError> {
        let result = self.commands.redo(&mut self.state);
        self.refresh();
        stepped(result)
    }

    /// Like [`Harness::try_undo`], logging failures.
    pub fn undo(&mut self) -> bool {
        self.try_undo().unwrap_or_else(|e| {
            error!("undo failed: {e}");
            false
        })
    }

    /// Like [`Harness::try_redo`], logging failures.
    pub fn redo(&mut self) -> bool {
        self.try_redo().unwrap_or_else(|e| {
            error!("redo failed: {e}");
            false
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear(&mut self.state);
        self.refresh();
    }

    // ── Selection ─────────────────────────────────────────────

    /// Select models by name, replacing the current selection.
    pub fn select(&mut self, names: &[&str]) -> Result<(), String> {
        let selection = names
            .iter()
            .map(|name| {
                self.state
                    .scene
                    .find_path(name)
                    .ok_or_else(|| format!("No model named {name}"))
            })
            .collect::<Result<Selection, String>>()?;
        self.state.select(selection);
        self.refresh();
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.state.selection.select_all(&mut self.state.scene);
        self.refresh();
    }

    pub fn deselect_all(&mut self) {
        self.state.deselect_all();
        self.refresh();
    }

    pub fn select_in_direction(&mut self, direction: Direction) -> bool {
        let moved = self
            .state
            .selection
            .select_in_direction(&mut self.state.scene, direction);
        self.refresh();
        moved
    }

    pub fn selected_names(&self) -> Vec<String> {
        self.state.selected_names()
    }

    // ── Actions ───────────────────────────────────────────────

    pub fn is_enabled(&self, action: Action) -> bool {
        self.actions.is_enabled(action)
    }

    pub fn toggle_state(&self, action: Action) -> bool {
        self.actions.toggle_state(action)
    }

    /// Apply an action if it is enabled.
    pub fn apply(&mut self, action: Action) -> Result<(), String> {
        if !self.actions.is_enabled(action) {
            return Err(format!("action {action:?} is disabled"));
        }
        self.actions
            .apply(action, &mut self.state, &mut self.commands)
            .map_err(|e| e.to_string())
    }

    // ── Sessions ──────────────────────────────────────────────

    pub fn export_session(&mut self) -> Result<String, SessionError> {
        let json = self.commands.export_session()?;
        self.commands.history_mut().mark_saved();
        Ok(json)
    }

    pub fn load_session(&mut self, json: &str) -> Result<(), SessionError> {
        let result = self.commands.load_session(json, &mut self.state);
        self.refresh();
        result
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn model(&self, name: &str) -> &Model {
        let path = self.state.scene.expect_path(name);
        self.state.scene.model(path.model())
    }

    pub fn status_of(&self, name: &str) -> ModelStatus {
        self.model(name).status()
    }

    /// Names of the top-level models, in order.
    pub fn top_level_names(&self) -> Vec<String> {
        self.names_of(self.state.scene.top_level_models())
    }

    /// Names of the children of `name`, in order.
    pub fn children_of(&self, name: &str) -> Vec<String> {
        self.names_of(self.model(name).children())
    }

    fn names_of(&self, ids: &[ModelId]) -> Vec<String> {
        ids.iter()
            .map(|id| self.state.scene.model(*id).name().to_string())
            .collect()
    }

    /// Number of models in the tree, excluding the root.
    pub fn model_count(&self) -> usize {
        self.state.scene.attached_count()
    }

    /// Scene tree, selection and history summary as JSON.
    pub fn inspect(&self) -> Value {
        let models: Vec<Value> = self
            .state
            .scene
            .top_level_models()
            .iter()
            .map(|id| self.inspect_model(*id))
            .collect();
        let history = self.commands.history();
        json!({
            "model_count": self.model_count(),
            "models": models,
            "selected": self.selected_names(),
            "history": {
                "count": history.len(),
                "current_index": history.current_index(),
                "can_undo": history.can_undo(),
                "can_redo": history.can_redo(),
                "unsaved": history.has_unsaved_changes(),
            },
        })
    }

    fn inspect_model(&self, id: ModelId) -> Value {
        let model = self.state.scene.model(id);
        let children: Vec<Value> = model
            .children()
            .iter()
            .map(|child| self.inspect_model(*child))
            .collect();
        let mut value = json!({
            "name": model.name(),
            "kind": model.kind.label(),
            "status": model.status(),
            "color": model.color.to_hex(),
        });
        if let Some(reason) = &model.invalid_reason {
            value["invalid_reason"] = json!(reason);
        }
        if !children.is_empty() {
            value["children"] = json!(children);
        }
        value
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// An empty history is not a failure.
fn stepped(result: Result<(), CommandError>) -> Result<bool, CommandError> {
    match result {
        Ok(()) => Ok(true),
        Err(CommandError::NothingToUndo | CommandError::NothingToRedo) => Ok(false),
        Err(e) => Err(e),
    }
}
