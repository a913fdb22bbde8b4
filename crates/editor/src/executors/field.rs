//! Multi-model field edits
//!
//! Color, complexity, radii, text, bevel, profile, spin and translation
//! commands all snapshot one value per model and put it back on undo.

use std::marker::PhantomData;

use shared::{Primitive, Transform};

use super::{ensure_exec_data, exec_data, expect_paths, reselect_if_settled, resolve_names};
use super::{ExecOp, Executor};
use crate::commands::{
    ChangeBevelCommand, ChangeColorCommand, ChangeComplexityCommand, ChangeCylinderCommand,
    ChangeProfileCommand, ChangeSpinCommand, ChangeTextCommand, ChangeTorusCommand, Command,
    CylinderRadius, TranslateCommand, TypedCommand,
};
use crate::state::{EditorState, Model, ModelKind, SelPath};

/// A command that sets one value on each of several models.
pub trait FieldCommand: TypedCommand {
    /// Pre-change value of one model.
    type Snapshot: Clone + 'static;

    fn model_names(&self) -> &[String];

    /// Whether `model` carries the edited field.
    fn applies_to(&self, _model: &Model) -> Result<(), String> {
        Ok(())
    }

    fn snapshot(model: &Model) -> Self::Snapshot;

    /// Apply the new value. `before` is the value captured on the first `Do`.
    fn apply(&self, model: &mut Model, before: &Self::Snapshot);

    fn restore(model: &mut Model, snapshot: &Self::Snapshot);
}

/// Exec data of a field command: where each model was and what it held.
struct FieldData<S> {
    entries: Vec<(SelPath, S)>,
}

/// Executor shared by every [`FieldCommand`].
pub struct FieldExecutor<C>(PhantomData<fn() -> C>);

impl<C> FieldExecutor<C> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for FieldExecutor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FieldCommand> Executor for FieldExecutor<C> {
    fn command_type_name(&self) -> &'static str {
        C::TYPE_NAME
    }

    fn check(&self, command: &Command, state: &EditorState) -> Result<(), String> {
        let cmd = command.payload::<C>();
        for path in resolve_names(state, cmd.model_names())? {
            let model = state.scene.model(path.model());
            cmd.applies_to(model)
                .map_err(|reason| format!("{}: {reason}", model.name()))?;
        }
        Ok(())
    }

    fn execute(&self, command: &mut Command, op: ExecOp, state: &mut EditorState) {
        ensure_exec_data(command, state, |command, state| {
            let cmd = command.payload::<C>();
            let entries = expect_paths(state, cmd.model_names())
                .into_iter()
                .map(|path| {
                    let snapshot = C::snapshot(state.scene.model(path.model()));
                    (path, snapshot)
                })
                .collect();
            FieldData::<C::Snapshot> { entries }
        });

        let cmd = command.payload::<C>();
        let data = exec_data::<FieldData<C::Snapshot>>(command);
        // Names are re-resolved on every run; the tree may have changed shape.
        let paths = expect_paths(state, cmd.model_names());
        for (path, (_, snapshot)) in paths.iter().zip(&data.entries) {
            let model = state.scene.model_mut(path.model());
            match op {
                ExecOp::Do => cmd.apply(model, snapshot),
                ExecOp::Undo => C::restore(model, snapshot),
            }
        }
        state.scene.notify_mutated();
        reselect_if_settled(command, op, state);
    }
}

// ── Field commands ────────────────────────────────────────────

impl FieldCommand for ChangeColorCommand {
    type Snapshot = shared::Color;

    fn model_names(&self) -> &[String] {
        &self.model_names
    }

    fn snapshot(model: &Model) -> Self::Snapshot {
        model.color
    }

    fn apply(&self, model: &mut Model, _before: &Self::Snapshot) {
        model.color = self.new_color;
    }

    fn restore(model: &mut Model, snapshot: &Self::Snapshot) {
        model.color = *snapshot;
    }
}

impl FieldCommand for ChangeComplexityCommand {
    type Snapshot = f32;

    fn model_names(&self) -> &[String] {
        &self.model_names
    }

    fn snapshot(model: &Model) -> f32 {
        model.complexity
    }

    fn apply(&self, model: &mut Model, _before: &f32) {
        model.complexity = self.new_complexity;
    }

    fn restore(model: &mut Model, snapshot: &f32) {
        model.complexity = *snapshot;
    }
}

impl FieldCommand for TranslateCommand {
    type Snapshot = Transform;

    fn model_names(&self) -> &[String] {
        &self.model_names
    }

    fn snapshot(model: &Model) -> Transform {
        model.transform
    }

    // Relative to the first-run position so repeated previews do not add up.
    fn apply(&self, model: &mut Model, before: &Transform) {
        model.transform.translation = before.translation + self.translation;
    }

    fn restore(model: &mut Model, snapshot: &Transform) {
        model.transform = *snapshot;
    }
}

/// Commands that edit parameters stored in the model kind.
macro_rules! kind_snapshot {
    () => {
        type Snapshot = ModelKind;

        fn model_names(&self) -> &[String] {
            &self.model_names
        }

        fn snapshot(model: &Model) -> ModelKind {
            model.kind.clone()
        }

        fn restore(model: &mut Model, snapshot: &ModelKind) {
            model.kind = snapshot.clone();
        }
    };
}

fn wrong_kind(model: &Model, expected: &str) -> ! {
    panic!(
        "{} is a {} model, expected {expected}",
        model.name(),
        model.kind.label()
    )
}

impl FieldCommand for ChangeCylinderCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Primitive(Primitive::Cylinder { .. }) => Ok(()),
            _ => Err("not a cylinder".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Primitive(Primitive::Cylinder {
                top_radius,
                bottom_radius,
            }) => match self.which_radius {
                CylinderRadius::Top => *top_radius = self.new_radius,
                CylinderRadius::Bottom => *bottom_radius = self.new_radius,
                CylinderRadius::Both => {
                    *top_radius = self.new_radius;
                    *bottom_radius = self.new_radius;
                }
            },
            _ => wrong_kind(model, "Cylinder"),
        }
    }
}

impl FieldCommand for ChangeTorusCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Primitive(Primitive::Torus {
                inner_radius,
                outer_radius,
            }) => {
                let (inner, outer) = if self.is_inner_radius {
                    (self.new_radius, outer_radius)
                } else {
                    (inner_radius, self.new_radius)
                };
                if inner < outer {
                    Ok(())
                } else {
                    Err(format!("inner radius {inner} must stay below outer radius {outer}"))
                }
            }
            _ => Err("not a torus".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Primitive(Primitive::Torus { inner_radius, .. }) if self.is_inner_radius => {
                *inner_radius = self.new_radius;
            }
            ModelKind::Primitive(Primitive::Torus { outer_radius, .. }) => {
                *outer_radius = self.new_radius;
            }
            _ => wrong_kind(model, "Torus"),
        }
    }
}

impl FieldCommand for ChangeTextCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Primitive(Primitive::Text { .. }) => Ok(()),
            _ => Err("not a text model".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Primitive(Primitive::Text { text }) => text.clone_from(&self.new_text),
            _ => wrong_kind(model, "Text"),
        }
    }
}

impl FieldCommand for ChangeBevelCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Beveled(_) => Ok(()),
            _ => Err("not a beveled model".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Beveled(bevel) => *bevel = self.new_bevel.clone(),
            _ => wrong_kind(model, "Beveled"),
        }
    }
}

impl FieldCommand for ChangeProfileCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Primitive(Primitive::Extruded { .. }) => {
                if self.new_profile.is_valid_closed() {
                    Ok(())
                } else {
                    Err("extruded profile needs at least 3 points".to_string())
                }
            }
            ModelKind::Primitive(Primitive::RevSurf { .. }) => Ok(()),
            _ => Err("not an extruded or revolved model".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Primitive(Primitive::Extruded { profile })
            | ModelKind::Primitive(Primitive::RevSurf { profile, .. }) => {
                *profile = self.new_profile.clone();
            }
            _ => wrong_kind(model, "Extruded or RevSurf"),
        }
    }
}

impl FieldCommand for ChangeSpinCommand {
    kind_snapshot!();

    fn applies_to(&self, model: &Model) -> Result<(), String> {
        match model.kind {
            ModelKind::Bent(_) | ModelKind::Twisted(_) => Ok(()),
            _ => Err("not a bent or twisted model".to_string()),
        }
    }

    fn apply(&self, model: &mut Model, _before: &ModelKind) {
        match &mut model.kind {
            ModelKind::Bent(spin) | ModelKind::Twisted(spin) => *spin = self.new_spin,
            _ => wrong_kind(model, "Bent or Twisted"),
        }
    }
}
