//! Wrap models in derived models, or combine several into one

use std::collections::HashSet;

use tracing::debug;

use super::structural::{check_min_children, reinsert_slots, remove_slots, removal_slots, Removed};
use super::{
    ensure_exec_data, exec_data, expect_paths, resolve_names, restore_selection, select_models,
    ExecOp, Executor,
};
use crate::commands::{Command, ConvertModelCommand, CreateCombinedModelCommand};
use crate::state::{EditorState, ModelId, ModelKind};

/// A derived model that took the place of its operand.
struct Wrapped {
    wrapper: ModelId,
    operand: Removed,
}

pub struct ConvertExecutor;

impl Executor for ConvertExecutor {
    fn command_type_name(&self) -> &'static str {
        "ConvertModelCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<ConvertModelCommand>();
        resolve_names(state, &cmd.model_names)?;
        if let Some(taken) = cmd
            .result_names
            .iter()
            .find(|n| state.scene.names().contains(n))
        {
            return Err(format!("Name {taken} is already in use"));
        }
        Ok(())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<ConvertModelCommand>();
            let prefix = cmd.conversion.name_prefix();
            let mut reserved = HashSet::new();
            let paths = expect_paths(state, &cmd.model_names);
            let slots = removal_slots(state, &paths);
            paths
                .iter()
                .enumerate()
                .map(|(k, path)| {
                    let operand = slots
                        .iter()
                        .copied()
                        .find(|slot| slot.id == path.model())
                        .unwrap_or_else(|| panic!("no slot for {}", path.display(&state.scene)));
                    let name = match cmd.result_names.get(k) {
                        Some(name) => name.clone(),
                        None => state.scene.names().create_avoiding(prefix, &reserved),
                    };
                    reserved.insert(name.clone());
                    let wrapper = state
                        .scene
                        .create_model(name, ModelKind::from_conversion(cmd.conversion));
                    Wrapped { wrapper, operand }
                })
                .collect::<Vec<_>>()
        });

        let wrapped = exec_data::<Vec<Wrapped>>(command);
        let names = wrapped
            .iter()
            .map(|w| state.scene.model(w.wrapper).name().to_string())
            .collect();
        let wrappers: Vec<ModelId> = wrapped.iter().map(|w| w.wrapper).collect();

        debug!(count = wrapped.len(), ?op, "convert");
        match op {
            ExecOp::Do => {
                for w in wrapped {
                    let operand = w.operand;
                    state
                        .scene
                        .replace_child(operand.parent, operand.index, w.wrapper);
                    state.scene.add_child(w.wrapper, operand.id);
                }
            }
            ExecOp::Undo => {
                for w in wrapped.iter().rev() {
                    let operand = w.operand;
                    state.scene.remove_child(w.wrapper, 0);
                    state
                        .scene
                        .replace_child(operand.parent, operand.index, operand.id);
                }
            }
        }
        command.payload_mut::<ConvertModelCommand>().result_names = names;

        match op {
            ExecOp::Do => {
                let paths = wrappers
                    .iter()
                    .filter_map(|id| state.scene.path_to(*id))
                    .collect();
                select_models(command, state, paths);
            }
            ExecOp::Undo => restore_selection(command, state),
        }
    }
}

/// The combined model, where it went, and the operands it absorbed.
struct Combined {
    id: ModelId,
    parent: ModelId,
    index: usize,
    /// Original slots, ordered by parent then index.
    slots: Vec<Removed>,
    /// Operands in command order.
    operands: Vec<ModelId>,
}

pub struct CombineExecutor;

impl Executor for CombineExecutor {
    fn command_type_name(&self) -> &'static str {
        "CreateCombinedModelCommand"
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<CreateCombinedModelCommand>();
        let paths = resolve_names(state, &cmd.model_names)?;
        if !cmd.result_name.is_empty() && state.scene.names().contains(&cmd.result_name) {
            return Err(format!("Name {} is already in use", cmd.result_name));
        }
        let target = paths.first().and_then(|p| p.parent_model());
        check_min_children(state, &paths, target)
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<CreateCombinedModelCommand>();
            let paths = expect_paths(state, &cmd.model_names);
            let slots = removal_slots(state, &paths);
            let operands: Vec<ModelId> = paths.iter().map(|p| p.model()).collect();

            // The combined model takes the first operand's place, shifted by
            // the operands removed ahead of it.
            let first = slots
                .iter()
                .find(|slot| slot.id == operands[0])
                .copied()
                .unwrap_or_else(|| panic!("combination without operands"));
            let shift = slots
                .iter()
                .filter(|slot| slot.parent == first.parent && slot.index < first.index)
                .count();

            let name = if cmd.result_name.is_empty() {
                state.scene.names().create(cmd.combination.name_prefix())
            } else {
                cmd.result_name.clone()
            };
            let id = state
                .scene
                .create_model(name, ModelKind::Combined(cmd.combination));
            Combined {
                id,
                parent: first.parent,
                index: first.index - shift,
                slots,
                operands,
            }
        });

        let data = exec_data::<Combined>(command);
        let (id, parent, index) = (data.id, data.parent, data.index);
        debug!(model = %id, operands = data.operands.len(), ?op, "combine");
        match op {
            ExecOp::Do => {
                remove_slots(state, &data.slots);
                state.scene.insert_child(parent, index, id);
                for operand in &data.operands {
                    state.scene.add_child(id, *operand);
                }
            }
            ExecOp::Undo => {
                for operand in &data.operands {
                    state.scene.detach(*operand);
                }
                state.scene.remove_child(parent, index);
                reinsert_slots(state, &data.slots);
            }
        }
        let name = state.scene.model(id).name().to_string();
        command.payload_mut::<CreateCombinedModelCommand>().result_name = name;

        match op {
            ExecOp::Do => {
                let paths = state.scene.path_to(id).into_iter().collect();
                select_models(command, state, paths);
            }
            ExecOp::Undo => restore_selection(command, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{CombinationType, ConversionType, CsgOperation, Primitive};

    fn state_with_boxes(names: &[&str]) -> EditorState {
        let mut state = EditorState::default();
        let root = state.scene.root();
        for name in names {
            let id = state
                .scene
                .create_model(*name, ModelKind::Primitive(Primitive::Box));
            state.scene.add_child(root, id);
        }
        state
    }

    fn top_names(state: &EditorState) -> Vec<String> {
        state
            .scene
            .top_level_models()
            .iter()
            .map(|id| state.scene.model(*id).name().to_string())
            .collect()
    }

    #[test]
    fn test_convert_wraps_in_place_and_undoes() {
        let mut state = state_with_boxes(&["Box_1", "Box_2"]);
        let mut cmd = Command::from(ConvertModelCommand {
            model_names: vec!["Box_2".into()],
            conversion: ConversionType::Bevel,
            result_names: vec![],
        });
        ConvertExecutor.execute(&mut cmd, ExecOp::Do, &mut state);
        assert_eq!(top_names(&state), vec!["Box_1", "Beveled_1"]);
        assert_eq!(
            state.scene.expect_path("Box_2").display(&state.scene),
            "Beveled_1/Box_2"
        );
        assert_eq!(
            cmd.payload::<ConvertModelCommand>().result_names,
            vec!["Beveled_1"]
        );
        assert_eq!(state.selected_names(), vec!["Beveled_1"]);

        ConvertExecutor.execute(&mut cmd, ExecOp::Undo, &mut state);
        assert_eq!(top_names(&state), vec!["Box_1", "Box_2"]);
        assert!(!state.scene.names().contains("Beveled_1"));
    }

    #[test]
    fn test_combine_takes_first_operand_slot() {
        let mut state = state_with_boxes(&["Box_1", "Box_2", "Box_3", "Box_4"]);
        let mut cmd = Command::from(CreateCombinedModelCommand {
            model_names: vec!["Box_3".into(), "Box_1".into()],
            combination: CombinationType::Csg {
                operation: CsgOperation::Difference,
            },
            result_name: String::new(),
        });
        assert!(CombineExecutor.check(&cmd, &state).is_ok());
        CombineExecutor.execute(&mut cmd, ExecOp::Do, &mut state);

        assert_eq!(top_names(&state), vec!["Box_2", "Difference_1", "Box_4"]);
        let combined = state.scene.expect_path("Difference_1").model();
        let operands: Vec<&str> = state
            .scene
            .model(combined)
            .children()
            .iter()
            .map(|c| state.scene.model(*c).name())
            .collect();
        assert_eq!(operands, vec!["Box_3", "Box_1"]);

        CombineExecutor.execute(&mut cmd, ExecOp::Undo, &mut state);
        assert_eq!(top_names(&state), vec!["Box_1", "Box_2", "Box_3", "Box_4"]);

        CombineExecutor.execute(&mut cmd, ExecOp::Do, &mut state);
        assert_eq!(state.scene.expect_path("Difference_1").model(), combined);
    }
}
