//! Copy and paste

use std::collections::HashSet;

use tracing::debug;

use super::structural::{reinsert_slots, remove_slots, Removed};
use super::{
    ensure_exec_data, exec_data, expect_paths, resolve_names, restore_selection, select_models,
    ExecOp, Executor,
};
use crate::commands::{Command, CopyCommand, PasteCommand};
use crate::state::{EditorState, ModelId};

/// Replaces the clipboard content. Has no undo and is never redone, so the
/// command manager keeps it as an orphan once it leaves the history.
///
/// The first run stores the copied subtrees in the command, so a replay
/// reproduces the clipboard even after the source models are gone.
pub struct CopyExecutor;

impl Executor for CopyExecutor {
    fn command_type_name(&self) -> &'static str {
        "CopyCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<CopyCommand>();
        if !cmd.copied.is_empty() {
            return Ok(());
        }
        resolve_names(state, &cmd.model_names).map(|_| ())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        if op == ExecOp::Undo {
            return;
        }
        if command.payload::<CopyCommand>().copied.is_empty() {
            let copied: Vec<_> = expect_paths(state, &command.payload::<CopyCommand>().model_names)
                .into_iter()
                .map(|path| state.scene.template_of(path.model()))
                .collect();
            command.payload_mut::<CopyCommand>().copied = copied;
        }
        let copied = command.payload::<CopyCommand>().copied.clone();
        state.clipboard.set(copied);
        debug!(models = state.clipboard.model_count(), "copied to clipboard");
    }
}

pub struct PasteExecutor;

impl PasteExecutor {
    fn target_parent(cmd: &PasteCommand, state: &EditorState) -> Option<ModelId> {
        match &cmd.parent_name {
            Some(name) => state.scene.find_by_name(name),
            None => Some(state.scene.root()),
        }
    }
}

impl Executor for PasteExecutor {
    fn command_type_name(&self) -> &'static str {
        "PasteCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<PasteCommand>();
        if state.clipboard.is_empty() {
            return Err("Clipboard is empty".to_string());
        }
        let parent = Self::target_parent(cmd, state)
            .ok_or_else(|| format!("No model named {}", cmd.parent_name.as_deref().unwrap_or("")))?;
        let parent_model = state.scene.model(parent);
        if parent != state.scene.root() && !parent_model.kind.has_operands() {
            return Err(format!("{} cannot hold other models", parent_model.name()));
        }
        if !cmd.result_names.is_empty() {
            if cmd.result_names.len() != state.clipboard.models().len() {
                return Err(format!(
                    "Expected {} result names, got {}",
                    state.clipboard.models().len(),
                    cmd.result_names.len()
                ));
            }
            if let Some(taken) = cmd
                .result_names
                .iter()
                .find(|n| state.scene.names().contains(n))
            {
                return Err(format!("Name {taken} is already in use"));
            }
        }
        Ok(())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<PasteCommand>();
            let parent = Self::target_parent(cmd, state)
                .unwrap_or_else(|| panic!("paste target {:?} does not exist", cmd.parent_name));
            assert!(!state.clipboard.is_empty(), "paste with an empty clipboard");

            let base = state.scene.model(parent).child_count();
            let mut reserved = HashSet::new();
            let copied = state.clipboard.models().to_vec();
            copied
                .iter()
                .enumerate()
                .map(|(i, template)| {
                    let name = match cmd.result_names.get(i) {
                        Some(name) => name.clone(),
                        None => state
                            .scene
                            .names()
                            .create_clone(&template.name, &reserved),
                    };
                    let id = state.scene.instantiate(template, name, &mut reserved);
                    Removed {
                        id,
                        parent,
                        index: base + i,
                    }
                })
                .collect::<Vec<_>>()
        });

        let slots = exec_data::<Vec<Removed>>(command).clone();
        let names: Vec<String> = slots
            .iter()
            .map(|slot| state.scene.model(slot.id).name().to_string())
            .collect();
        command.payload_mut::<PasteCommand>().result_names = names;

        debug!(count = slots.len(), ?op, "paste");
        match op {
            ExecOp::Do => {
                reinsert_slots(state, &slots);
                let paths = slots
                    .iter()
                    .filter_map(|slot| state.scene.path_to(slot.id))
                    .collect();
                select_models(command, state, paths);
            }
            ExecOp::Undo => {
                remove_slots(state, &slots);
                restore_selection(command, state);
            }
        }
    }
}
