//! User-facing actions and their enabled/toggle state
//!
//! Actions are what menus and shortcuts trigger. Each one either builds a
//! command from the current selection and hands it to the command manager,
//! or drives the selection/session state directly. Enablement is recomputed
//! by [`ActionManager::refresh`] after anything changes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::{CombinationType, ConversionType, CsgOperation};
use tracing::debug;

use crate::commands::{
    ChangeOrderCommand, Command, ConvertModelCommand, CopyCommand, CreateCombinedModelCommand,
    DeleteCommand, PasteCommand,
};
use crate::error::CommandError;
use crate::manager::CommandManager;
use crate::state::{Direction, EditorState, SelPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    MovePrevious,
    MoveNext,
    CombineUnion,
    CombineIntersection,
    CombineDifference,
    CombineHull,
    ConvertBevel,
    ConvertBend,
    ConvertTwist,
    ConvertMirror,
    SelectAll,
    SelectNone,
    SelectParent,
    SelectFirstChild,
    SelectPreviousSibling,
    SelectNextSibling,
    HideSelected,
    ShowAll,
    ToggleShowEdges,
    ToggleBuildVolume,
    TogglePointTarget,
}

impl Action {
    pub const ALL: [Action; 26] = [
        Action::Undo,
        Action::Redo,
        Action::Copy,
        Action::Paste,
        Action::Delete,
        Action::MovePrevious,
        Action::MoveNext,
        Action::CombineUnion,
        Action::CombineIntersection,
        Action::CombineDifference,
        Action::CombineHull,
        Action::ConvertBevel,
        Action::ConvertBend,
        Action::ConvertTwist,
        Action::ConvertMirror,
        Action::SelectAll,
        Action::SelectNone,
        Action::SelectParent,
        Action::SelectFirstChild,
        Action::SelectPreviousSibling,
        Action::SelectNextSibling,
        Action::HideSelected,
        Action::ShowAll,
        Action::ToggleShowEdges,
        Action::ToggleBuildVolume,
        Action::TogglePointTarget,
    ];

    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            Action::ToggleShowEdges | Action::ToggleBuildVolume | Action::TogglePointTarget
        )
    }

    fn combination(self) -> Option<CombinationType> {
        let operation = match self {
            Action::CombineUnion => CsgOperation::Union,
            Action::CombineIntersection => CsgOperation::Intersection,
            Action::CombineDifference => CsgOperation::Difference,
            Action::CombineHull => return Some(CombinationType::Hull),
            _ => return None,
        };
        Some(CombinationType::Csg { operation })
    }

    fn conversion(self) -> Option<ConversionType> {
        match self {
            Action::ConvertBevel => Some(ConversionType::Bevel),
            Action::ConvertBend => Some(ConversionType::Bend),
            Action::ConvertTwist => Some(ConversionType::Twist),
            Action::ConvertMirror => Some(ConversionType::Mirror),
            _ => None,
        }
    }

    fn direction(self) -> Option<Direction> {
        match self {
            Action::SelectParent => Some(Direction::Parent),
            Action::SelectFirstChild => Some(Direction::FirstChild),
            Action::SelectPreviousSibling => Some(Direction::PreviousSibling),
            Action::SelectNextSibling => Some(Direction::NextSibling),
            _ => None,
        }
    }

    /// Command this action adds to the history, built from the selection.
    fn command(self, state: &EditorState) -> Option<Command> {
        let names = state.selected_names();
        let command = match self {
            Action::Copy => CopyCommand::new(names).into(),
            Action::Paste => PasteCommand::default().into(),
            Action::Delete => DeleteCommand { model_names: names }.into(),
            Action::MovePrevious | Action::MoveNext => ChangeOrderCommand {
                model_names: names,
                is_previous: self == Action::MovePrevious,
            }
            .into(),
            _ => {
                if let Some(combination) = self.combination() {
                    CreateCombinedModelCommand {
                        model_names: names,
                        combination,
                        result_name: String::new(),
                    }
                    .into()
                } else if let Some(conversion) = self.conversion() {
                    ConvertModelCommand {
                        model_names: names,
                        conversion,
                        result_names: Vec::new(),
                    }
                    .into()
                } else {
                    return None;
                }
            }
        };
        Some(command)
    }
}

/// Tracks which actions are enabled and the checked state of toggles.
#[derive(Debug, Clone)]
pub struct ActionManager {
    enabled: HashMap<Action, bool>,
    toggles: HashMap<Action, bool>,
}

impl Default for ActionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionManager {
    /// Everything disabled until the first refresh.
    pub fn new() -> Self {
        Self {
            enabled: Action::ALL.iter().map(|a| (*a, false)).collect(),
            toggles: Action::ALL
                .iter()
                .filter(|a| a.is_toggle())
                .map(|a| (*a, false))
                .collect(),
        }
    }

    /// Re-read toggle states from the session and recompute enablement.
    ///
    /// Undo and redo write session state without going through the toggles,
    /// so toggle states are always taken from the session first.
    pub fn refresh(&mut self, state: &EditorState, commands: &CommandManager) {
        self.toggles
            .insert(Action::ToggleShowEdges, state.session.edges_shown());
        self.toggles
            .insert(Action::ToggleBuildVolume, state.session.build_volume_visible());
        self.toggles
            .insert(Action::TogglePointTarget, state.session.point_target_visible());

        for action in Action::ALL {
            let enabled = Self::compute_enabled(action, state, commands);
            self.enabled.insert(action, enabled);
        }
    }

    fn compute_enabled(action: Action, state: &EditorState, commands: &CommandManager) -> bool {
        let selection = state.selection.selection();
        match action {
            Action::Undo => commands.can_undo(),
            Action::Redo => commands.can_redo(),
            Action::Paste => !state.clipboard.is_empty(),
            Action::SelectAll => !state.scene.top_level_models().is_empty(),
            Action::SelectNone | Action::HideSelected => selection.has_any(),
            Action::ShowAll => state.selection.has_hidden_models(&state.scene),
            Action::ToggleShowEdges | Action::ToggleBuildVolume => true,
            Action::TogglePointTarget => state.session.point_target().is_some(),
            _ => {
                if let Some(direction) = action.direction() {
                    return state
                        .selection
                        .can_select_in_direction(&state.scene, direction);
                }
                if !selection.has_any() {
                    return false;
                }
                action
                    .command(state)
                    .is_some_and(|command| commands.check(&command, state).is_ok())
            }
        }
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        self.enabled.get(&action).copied().unwrap_or(false)
    }

    /// Checked state of a toggle action.
    pub fn toggle_state(&self, action: Action) -> bool {
        assert!(action.is_toggle(), "{action:?} is not a toggle");
        self.toggles.get(&action).copied().unwrap_or(false)
    }

    /// Run an enabled action, then refresh.
    pub fn apply(
        &mut self,
        action: Action,
        state: &mut EditorState,
        commands: &mut CommandManager,
    ) -> Result<(), CommandError> {
        assert!(self.is_enabled(action), "{action:?} is disabled");
        debug!(?action, "applying action");
        match action {
            Action::Undo => commands.undo(state)?,
            Action::Redo => commands.redo(state)?,
            Action::SelectAll => state.selection.select_all(&mut state.scene),
            Action::SelectNone => state.deselect_all(),
            Action::HideSelected => hide_selected(state),
            Action::ShowAll => state.selection.show_all(&mut state.scene),
            Action::ToggleShowEdges => {
                let shown = !self.toggle_state(action);
                state.session.set_edges_shown(shown);
            }
            Action::ToggleBuildVolume => {
                let visible = !self.toggle_state(action);
                state.session.set_build_volume_visible(visible);
            }
            Action::TogglePointTarget => {
                let visible = !self.toggle_state(action);
                state.session.set_point_target_visible(visible);
            }
            _ => {
                if let Some(direction) = action.direction() {
                    state.selection.select_in_direction(&mut state.scene, direction);
                } else if let Some(command) = action.command(state) {
                    commands.add_and_do(command, state)?;
                }
            }
        }
        self.refresh(state, commands);
        Ok(())
    }
}

/// Hide the top-level model of every selected path.
fn hide_selected(state: &mut EditorState) {
    let mut tops: Vec<SelPath> = Vec::new();
    for path in state.selection.selection().paths() {
        if let Some(top) = path.top_level_path() {
            if !tops.contains(&top) {
                tops.push(top);
            }
        }
    }
    for top in &tops {
        state.selection.hide_model(&mut state.scene, top);
    }
}
