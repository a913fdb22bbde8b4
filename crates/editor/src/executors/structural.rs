//! Delete, reorder and rename

use std::collections::HashMap;

use tracing::debug;

use super::{
    ensure_exec_data, exec_data, expect_paths, reselect_if_settled, resolve_names,
    restore_selection, ExecOp, Executor,
};
use crate::commands::{ChangeNameCommand, ChangeOrderCommand, Command, DeleteCommand};
use crate::state::{EditorState, ModelId, SelPath};

/// A model taken out of the tree and the slot it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Removed {
    pub id: ModelId,
    pub parent: ModelId,
    pub index: usize,
}

/// Slots of the given models, ordered by parent then index.
pub(super) fn removal_slots(state: &EditorState, paths: &[SelPath]) -> Vec<Removed> {
    let mut slots: Vec<Removed> = paths
        .iter()
        .map(|path| {
            let id = path.model();
            let parent = path
                .parent_model()
                .unwrap_or_else(|| panic!("cannot remove the root"));
            let index = state
                .scene
                .child_index(parent, id)
                .unwrap_or_else(|| panic!("{} is not a child of its parent", path.display(&state.scene)));
            Removed { id, parent, index }
        })
        .collect();
    slots.sort_by_key(|slot| (slot.parent, slot.index));
    slots
}

/// Remove models back to front so recorded indices stay valid.
pub(super) fn remove_slots(state: &mut EditorState, slots: &[Removed]) {
    for slot in slots.iter().rev() {
        let removed = state.scene.remove_child(slot.parent, slot.index);
        debug_assert_eq!(removed, slot.id);
    }
}

/// Reinsert models front to back at their recorded indices.
pub(super) fn reinsert_slots(state: &mut EditorState, slots: &[Removed]) {
    for slot in slots {
        state.scene.insert_child(slot.parent, slot.index, slot.id);
    }
}

/// Fail when removing `paths` would leave a parent with too few children.
///
/// `replacement` names a parent that receives one new child in exchange.
pub(super) fn check_min_children(
    state: &EditorState,
    paths: &[SelPath],
    replacement: Option<ModelId>,
) -> Result<(), String> {
    let mut removed: HashMap<ModelId, usize> = HashMap::new();
    for path in paths {
        if let Some(parent) = path.parent_model() {
            *removed.entry(parent).or_default() += 1;
        }
    }
    for (parent, count) in removed {
        let model = state.scene.model(parent);
        let added = usize::from(replacement == Some(parent));
        let remaining = model.child_count() + added - count;
        let min = model.kind.min_child_count();
        if remaining < min {
            return Err(format!(
                "{} needs at least {min} children",
                model.name()
            ));
        }
    }
    Ok(())
}

pub struct DeleteExecutor;

impl Executor for DeleteExecutor {
    fn command_type_name(&self) -> &'static str {
        "DeleteCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<DeleteCommand>();
        let paths = resolve_names(state, &cmd.model_names)?;
        check_min_children(state, &paths, None)
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<DeleteCommand>();
            let paths = expect_paths(state, &cmd.model_names);
            removal_slots(state, &paths)
        });
        let slots = exec_data::<Vec<Removed>>(command);
        debug!(count = slots.len(), ?op, "delete");
        match op {
            ExecOp::Do => {
                if !command.is_validating() {
                    state.deselect_all();
                }
                remove_slots(state, slots);
            }
            ExecOp::Undo => {
                reinsert_slots(state, slots);
                restore_selection(command, state);
            }
        }
    }
}

/// One sibling move.
#[derive(Debug, Clone, Copy)]
struct Move {
    parent: ModelId,
    from: usize,
    to: usize,
}

pub struct ChangeOrderExecutor;

impl Executor for ChangeOrderExecutor {
    fn command_type_name(&self) -> &'static str {
        "ChangeOrderCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<ChangeOrderCommand>();
        let paths = resolve_names(state, &cmd.model_names)?;
        for slot in removal_slots(state, &paths) {
            let count = state.scene.model(slot.parent).child_count();
            let at_edge = if cmd.is_previous {
                slot.index == 0
            } else {
                slot.index + 1 == count
            };
            if at_edge {
                return Err(format!(
                    "{} cannot move further",
                    state.scene.model(slot.id).name()
                ));
            }
        }
        Ok(())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<ChangeOrderCommand>();
            let paths = expect_paths(state, &cmd.model_names);
            let mut slots = removal_slots(state, &paths);
            // Moving towards the back starts with the last model.
            if !cmd.is_previous {
                slots.reverse();
            }
            slots
                .into_iter()
                .map(|slot| Move {
                    parent: slot.parent,
                    from: slot.index,
                    to: if cmd.is_previous {
                        slot.index - 1
                    } else {
                        slot.index + 1
                    },
                })
                .collect::<Vec<_>>()
        });
        let moves = exec_data::<Vec<Move>>(command);
        match op {
            ExecOp::Do => {
                for m in moves {
                    state.scene.move_child(m.parent, m.from, m.to);
                }
            }
            ExecOp::Undo => {
                for m in moves.iter().rev() {
                    state.scene.move_child(m.parent, m.to, m.from);
                }
            }
        }
        reselect_if_settled(command, op, state);
    }
}

pub struct ChangeNameExecutor;

impl Executor for ChangeNameExecutor {
    fn command_type_name(&self) -> &'static str {
        "ChangeNameCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<ChangeNameCommand>();
        if state.scene.find_path(&cmd.old_name).is_none() {
            return Err(format!("No model named {}", cmd.old_name));
        }
        if state.scene.names().contains(&cmd.new_name) {
            return Err(format!("Name {} is already in use", cmd.new_name));
        }
        Ok(())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<ChangeNameCommand>();
            state.scene.expect_path(&cmd.old_name).model()
        });
        let id = *exec_data::<ModelId>(command);
        let cmd = command.payload::<ChangeNameCommand>();
        let name = match op {
            ExecOp::Do => &cmd.new_name,
            ExecOp::Undo => &cmd.old_name,
        };
        state.scene.rename(id, name);
        if !command.is_validating() {
            state.selection.update(&mut state.scene);
        }
    }
}
