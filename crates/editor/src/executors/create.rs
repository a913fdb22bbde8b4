//! Creation of primitive and imported models

use std::path::Path;

use shared::{Primitive, Transform};
use tracing::{debug, warn};

use super::{ensure_exec_data, exec_data, restore_selection, select_models, ExecOp, Executor};
use crate::commands::{Command, CreateImportedModelCommand, CreatePrimitiveModelCommand};
use crate::state::{EditorState, ModelId, ModelKind};

/// The created model and where it sits in the tree.
///
/// Redo reinserts this very instance instead of building a new one.
pub(super) struct Created {
    pub id: ModelId,
    pub parent: ModelId,
    pub index: usize,
}

/// Insert (`Do`) or remove (`Undo`) the model a creation built.
fn place_created(command: &Command, op: ExecOp, state: &mut EditorState) {
    let created = exec_data::<Created>(command);
    let (id, parent, index) = (created.id, created.parent, created.index);
    match op {
        ExecOp::Do => {
            state.scene.insert_child(parent, index, id);
            let path = state.scene.path_to(id).into_iter().collect();
            select_models(command, state, path);
        }
        ExecOp::Undo => {
            state.scene.detach(id);
            restore_selection(command, state);
        }
    }
}

fn check_result_name(name: &str, state: &EditorState) -> Result<(), String> {
    if !name.is_empty() && state.scene.names().contains(name) {
        return Err(format!("Name {name} is already in use"));
    }
    Ok(())
}

pub struct CreatePrimitiveExecutor;

impl Executor for CreatePrimitiveExecutor {
    fn command_type_name(&self) -> &'static str {
        "CreatePrimitiveModelCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        check_result_name(&command.payload::<CreatePrimitiveModelCommand>().result_name, state)
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<CreatePrimitiveModelCommand>();
            let name = if cmd.result_name.is_empty() {
                state.scene.names().create(cmd.primitive_type.name_prefix())
            } else {
                cmd.result_name.clone()
            };
            let kind = ModelKind::Primitive(Primitive::from_type(cmd.primitive_type));
            let id = state.scene.create_model(name, kind);
            state.scene.model_mut(id).transform = Transform::from_translation(cmd.translation);
            let parent = state.scene.root();
            let index = state.scene.model(parent).child_count();
            Created { id, parent, index }
        });
        // Persist the generated name so replays are stable.
        let id = exec_data::<Created>(command).id;
        let name = state.scene.model(id).name().to_string();
        command.payload_mut::<CreatePrimitiveModelCommand>().result_name = name;

        debug!(model = %id, ?op, "create primitive");
        place_created(command, op, state);
    }
}

pub struct CreateImportedExecutor;

impl Executor for CreateImportedExecutor {
    fn command_type_name(&self) -> &'static str {
        "CreateImportedModelCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        check_result_name(&command.payload::<CreateImportedModelCommand>().result_name, state)
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<CreateImportedModelCommand>();
            let name = if cmd.result_name.is_empty() {
                state.scene.names().create("Imported")
            } else {
                cmd.result_name.clone()
            };
            let kind = ModelKind::Primitive(Primitive::Imported {
                path: cmd.path.clone(),
            });
            let id = state.scene.create_model(name, kind);
            // A file that cannot be loaded leaves a placeholder behind.
            if let Err(reason) = state.loader.load(Path::new(&cmd.path), &state.settings.import) {
                warn!(path = %cmd.path, "import failed: {reason}");
                state.scene.model_mut(id).invalid_reason = Some(reason);
            }
            let parent = state.scene.root();
            let index = state.scene.model(parent).child_count();
            Created { id, parent, index }
        });
        let id = exec_data::<Created>(command).id;
        let name = state.scene.model(id).name().to_string();
        command.payload_mut::<CreateImportedModelCommand>().result_name = name;

        debug!(model = %id, ?op, "create imported");
        place_created(command, op, state);
    }
}
