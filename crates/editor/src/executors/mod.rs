//! Executors apply and reverse commands
//!
//! One executor per command type, looked up by type name in an
//! [`ExecutorRegistry`]. Every executor follows the same shape: build the
//! command's exec data on the first `Do`, apply the command's values on
//! `Do`, put the snapshot back on `Undo`, and ask for reselection once the
//! edit has settled.

mod clipboard;
mod convert;
mod create;
mod field;
mod session;
mod structural;

use std::any::Any;
use std::collections::HashMap;

use tracing::debug;

use crate::commands::{Command, CommandKind};
use crate::state::{EditorState, SelPath, Selection};

pub use clipboard::{CopyExecutor, PasteExecutor};
pub use convert::{CombineExecutor, ConvertExecutor};
pub use create::{CreateImportedExecutor, CreatePrimitiveExecutor};
pub use field::{FieldCommand, FieldExecutor};
pub use session::PointTargetExecutor;
pub use structural::{ChangeNameExecutor, ChangeOrderExecutor, DeleteExecutor};

/// Direction of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecOp {
    Do,
    Undo,
}

/// Applies and reverses one command type.
pub trait Executor {
    /// Type name of the commands this executor handles.
    fn command_type_name(&self) -> &'static str;

    /// Whether the command can run against the current state.
    ///
    /// Executors assume this holds; running an inapplicable command is fatal.
    fn check(&self, _command: &Command, _state: &EditorState) -> Result<(), String> {
        Ok(())
    }

    /// Apply (`Do`) or reverse (`Undo`) the command. Between previews the
    /// command manager reverses the last `Do` before running it again.
    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState);
}

/// Executors keyed by command type name.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<&'static str, Box<dyn Executor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.executors.keys().collect();
        names.sort();
        f.debug_struct("ExecutorRegistry")
            .field("executors", &names)
            .finish()
    }
}

impl ExecutorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding an executor for every command type.
    pub fn with_default_executors() -> Self {
        use crate::commands::{
            ChangeBevelCommand, ChangeColorCommand, ChangeComplexityCommand,
            ChangeCylinderCommand, ChangeProfileCommand, ChangeSpinCommand, ChangeTextCommand,
            ChangeTorusCommand, TranslateCommand,
        };

        let mut registry = Self::new();
        registry.register(CreatePrimitiveExecutor);
        registry.register(CreateImportedExecutor);
        registry.register(CombineExecutor);
        registry.register(ConvertExecutor);
        registry.register(DeleteExecutor);
        registry.register(ChangeOrderExecutor);
        registry.register(ChangeNameExecutor);
        registry.register(CopyExecutor);
        registry.register(PasteExecutor);
        registry.register(FieldExecutor::<ChangeColorCommand>::new());
        registry.register(FieldExecutor::<ChangeComplexityCommand>::new());
        registry.register(FieldExecutor::<ChangeCylinderCommand>::new());
        registry.register(FieldExecutor::<ChangeTorusCommand>::new());
        registry.register(FieldExecutor::<ChangeTextCommand>::new());
        registry.register(FieldExecutor::<ChangeBevelCommand>::new());
        registry.register(FieldExecutor::<ChangeProfileCommand>::new());
        registry.register(FieldExecutor::<ChangeSpinCommand>::new());
        registry.register(FieldExecutor::<TranslateCommand>::new());
        registry.register(PointTargetExecutor);
        debug_assert_eq!(registry.len(), CommandKind::type_names().len());
        registry
    }

    /// Add an executor, replacing any registered for the same type.
    pub fn register(&mut self, executor: impl Executor + 'static) -> Option<Box<dyn Executor>> {
        let name = executor.command_type_name();
        self.executors.insert(name, Box::new(executor))
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn Executor> {
        self.executors.get(type_name).map(|e| e.as_ref())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.executors.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Drop every executor.
    pub fn clear(&mut self) {
        self.executors.clear();
    }
}

// ── Helpers shared by executors ───────────────────────────────

/// Build the command's exec data unless it already exists.
pub fn ensure_exec_data<T: Any>(
    command: &mut Command,
    state: &mut EditorState,
    build: impl FnOnce(&Command, &mut EditorState) -> T,
) {
    if !command.has_exec_data() {
        debug!(command = command.type_name(), "building exec data");
        let data = build(command, state);
        command.set_exec_data(data);
    }
}

/// Exec data of the expected type. Anything else is fatal.
pub fn exec_data<T: Any>(command: &Command) -> &T {
    command.exec_data::<T>().unwrap_or_else(|| {
        panic!(
            "{} has no exec data of type {}",
            command.type_name(),
            std::any::type_name::<T>()
        )
    })
}

/// Refresh selection-dependent tools, but only once an edit has settled.
pub fn reselect_if_settled(command: &Command, op: ExecOp, state: &mut EditorState) {
    if command.is_validating() {
        return;
    }
    if op == ExecOp::Undo || command.is_finalized() {
        state.selection.reselect_all(&mut state.scene);
    }
}

/// Select the given models after a structural change.
pub(crate) fn select_models(command: &Command, state: &mut EditorState, paths: Vec<SelPath>) {
    if command.is_validating() {
        return;
    }
    state.select(Selection::from_paths(paths));
}

/// Put back the selection captured before the command first ran.
pub(crate) fn restore_selection(command: &Command, state: &mut EditorState) {
    if command.is_validating() {
        return;
    }
    let restored: Selection = command
        .selection()
        .map(|sel| {
            sel.paths()
                .iter()
                .filter(|p| state.scene.is_valid_path(p))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    state.select(restored);
}

/// Resolve names for an applicability check.
pub(crate) fn resolve_names(state: &EditorState, names: &[String]) -> Result<Vec<SelPath>, String> {
    let paths = names
        .iter()
        .map(|name| {
            state
                .scene
                .find_path(name)
                .ok_or_else(|| format!("No model named {name}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    for (i, a) in paths.iter().enumerate() {
        if paths[i + 1..].iter().any(|b| a.conflicts_with(b)) {
            return Err(format!(
                "{} overlaps another model of the command",
                names[i]
            ));
        }
    }
    Ok(paths)
}

/// Resolve names that must exist.
pub(crate) fn expect_paths(state: &EditorState, names: &[String]) -> Vec<SelPath> {
    names.iter().map(|name| state.scene.expect_path(name)).collect()
}
