//! Selection state machine
//!
//! The selection manager is the single source of truth for which models are
//! selected. Every change of the selection is mirrored into the per-model
//! [`ModelStatus`] and announced to registered observers.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::path::SelPath;
use super::set::Selection;
use crate::state::scene::{ModelId, ModelStatus, Scene};

/// Kind of change announced to selection observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionOperation {
    /// A new selection was applied.
    Selection,
    /// The same selection was announced again to refresh dependents.
    Reselection,
    /// The previous selection was dropped. Sent before the new one applies.
    Deselection,
    /// Selected models changed without a change of selection.
    Update,
}

/// Navigation relative to the primary selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Parent,
    FirstChild,
    PreviousSibling,
    NextSibling,
}

/// Handle returned by [`SelectionManager::add_observer`].
pub type ObserverId = usize;

type Observer = Box<dyn FnMut(&Selection, SelectionOperation)>;

#[derive(Default)]
pub struct SelectionManager {
    selection: Selection,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: ObserverId,
}

impl fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionManager")
            .field("selection", &self.selection)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Register a callback for every selection change.
    pub fn add_observer(
        &mut self,
        observer: impl FnMut(&Selection, SelectionOperation) + 'static,
    ) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    // ── Selection changes ─────────────────────────────────────

    /// Replace the selection. Conflicting paths are cleaned out first, later
    /// entries winning; the first survivor becomes primary.
    pub fn change_selection(&mut self, scene: &mut Scene, new_selection: Selection) {
        self.deselect_all_silently(scene);
        self.selection = new_selection.cleaned();
        debug_assert!(
            self.selection.paths().iter().all(|p| scene.is_valid_path(p)),
            "selection contains a stale path"
        );
        self.apply_statuses(scene);
        if self.selection.has_any() {
            debug!(count = self.selection.count(), "selection changed");
            self.notify(SelectionOperation::Selection);
        }
    }

    /// Select every visible top-level model.
    ///
    /// The primary moves up to its top-level ancestor and existing entries
    /// keep their order ahead of the newly added models.
    pub fn select_all(&mut self, scene: &mut Scene) {
        let mut paths: Vec<SelPath> = Vec::new();
        for path in self.selection.paths() {
            if let Some(top) = path.top_level_path() {
                if !paths.contains(&top) {
                    paths.push(top);
                }
            }
        }
        for top in scene.top_level_paths() {
            let hidden = scene.model(top.model()).status() == ModelStatus::HiddenByUser;
            if !hidden && !paths.contains(&top) {
                paths.push(top);
            }
        }
        paths.retain(|p| scene.model(p.model()).status() != ModelStatus::HiddenByUser);
        self.change_selection(scene, Selection::from_paths(paths));
    }

    pub fn deselect_all(&mut self, scene: &mut Scene) {
        self.deselect_all_silently(scene);
    }

    /// Announce the current selection again, e.g. after an edit changed the
    /// selected models so that attached tools rebuild themselves.
    pub fn reselect_all(&mut self, scene: &mut Scene) {
        self.reset_statuses(scene);
        self.apply_statuses(scene);
        if self.selection.has_any() {
            self.notify(SelectionOperation::Reselection);
        }
    }

    /// Drop entries that no longer address attached models and announce the
    /// selected models as updated.
    pub fn update(&mut self, scene: &mut Scene) {
        let valid: Vec<SelPath> = self
            .selection
            .paths()
            .iter()
            .filter(|p| scene.is_valid_path(p))
            .cloned()
            .collect();
        self.selection = Selection::from_paths(valid).cleaned();
        self.reset_statuses(scene);
        self.apply_statuses(scene);
        self.notify(SelectionOperation::Update);
    }

    // ── Hiding ────────────────────────────────────────────────

    /// Hide a top-level model, removing it and its descendants from the selection.
    pub fn hide_model(&mut self, scene: &mut Scene, path: &SelPath) {
        assert!(path.is_top_level(), "only top-level models can be hidden");
        if self.selection.conflicts_with(path) {
            let remaining: Selection = self
                .selection
                .paths()
                .iter()
                .filter(|p| !p.conflicts_with(path))
                .cloned()
                .collect();
            self.change_selection(scene, remaining);
        }
        scene.set_status(path.model(), ModelStatus::HiddenByUser);
        for descendant in scene.descendants(path.model()) {
            scene.set_status(descendant, ModelStatus::AncestorShown);
        }
        self.notify(SelectionOperation::Update);
    }

    /// Show every top-level model hidden by the user.
    pub fn show_all(&mut self, scene: &mut Scene) {
        let hidden: Vec<ModelId> = scene
            .top_level_models()
            .iter()
            .copied()
            .filter(|id| scene.model(*id).status() == ModelStatus::HiddenByUser)
            .collect();
        for id in &hidden {
            scene.set_status(*id, ModelStatus::Unselected);
        }
        if !hidden.is_empty() {
            self.notify(SelectionOperation::Update);
        }
    }

    pub fn has_hidden_models(&self, scene: &Scene) -> bool {
        scene
            .top_level_models()
            .iter()
            .any(|id| scene.model(*id).status() == ModelStatus::HiddenByUser)
    }

    // ── Navigation ────────────────────────────────────────────

    /// Path the primary selection would move to in `direction`.
    pub fn path_in_direction(&self, scene: &Scene, direction: Direction) -> Option<SelPath> {
        let primary = self.selection.primary()?;
        match direction {
            Direction::Parent => {
                if primary.is_top_level() {
                    None
                } else {
                    primary.parent_path()
                }
            }
            Direction::FirstChild => scene
                .model(primary.model())
                .children()
                .first()
                .map(|child| primary.child_path(*child)),
            Direction::PreviousSibling | Direction::NextSibling => {
                let parent_path = primary.parent_path()?;
                let siblings = scene.model(parent_path.model()).children();
                let count = siblings.len();
                let index = siblings.iter().position(|s| *s == primary.model())?;
                let step = |i: usize| match direction {
                    Direction::PreviousSibling => (i + count - 1) % count,
                    _ => (i + 1) % count,
                };
                let mut candidate = step(index);
                while candidate != index {
                    let sibling = siblings[candidate];
                    if scene.model(sibling).status() != ModelStatus::HiddenByUser {
                        return Some(parent_path.child_path(sibling));
                    }
                    candidate = step(candidate);
                }
                None
            }
        }
    }

    pub fn can_select_in_direction(&self, scene: &Scene, direction: Direction) -> bool {
        self.path_in_direction(scene, direction).is_some()
    }

    /// Move the selection to a single path relative to the primary.
    pub fn select_in_direction(&mut self, scene: &mut Scene, direction: Direction) -> bool {
        match self.path_in_direction(scene, direction) {
            Some(path) => {
                self.change_selection(scene, Selection::from_path(path));
                true
            }
            None => false,
        }
    }

    // ── Status state machine ──────────────────────────────────

    fn deselect_all_silently(&mut self, scene: &mut Scene) {
        let had_selection = self.selection.has_any();
        self.reset_statuses(scene);
        if had_selection {
            self.notify(SelectionOperation::Deselection);
            self.selection.clear();
        }
    }

    /// Top-level models become shown, everything below them is shadowed.
    fn reset_statuses(&self, scene: &mut Scene) {
        let tops: Vec<ModelId> = scene.top_level_models().to_vec();
        for top in tops {
            if scene.model(top).status() != ModelStatus::HiddenByUser {
                scene.set_status(top, ModelStatus::Unselected);
            }
            for descendant in scene.descendants(top) {
                scene.set_status(descendant, ModelStatus::AncestorShown);
            }
        }
    }

    fn apply_statuses(&self, scene: &mut Scene) {
        for (i, path) in self.selection.paths().iter().enumerate() {
            select_model(scene, path, i == 0);
        }
    }

    fn notify(&mut self, operation: SelectionOperation) {
        for (_, observer) in &mut self.observers {
            observer(&self.selection, operation);
        }
    }
}

/// Mark `path` as selected, showing its siblings and shadowing its ancestors.
fn select_model(scene: &mut Scene, path: &SelPath, is_primary: bool) {
    // Ancestors below the root, top-down, become DescendantShown. An
    // ancestor that was shown hands visibility down to its children.
    let ancestors: Vec<ModelId> = path.ids()[1..path.len() - 1].to_vec();
    for ancestor in ancestors {
        let previous = scene.model(ancestor).status();
        scene.set_status(ancestor, ModelStatus::DescendantShown);
        if previous == ModelStatus::Unselected {
            let children: Vec<ModelId> = scene.model(ancestor).children().to_vec();
            for child in children {
                if scene.model(child).status() == ModelStatus::AncestorShown {
                    scene.set_status(child, ModelStatus::Unselected);
                }
            }
        }
    }

    if let Some(parent) = path.parent_model() {
        let siblings: Vec<ModelId> = scene.model(parent).children().to_vec();
        for sibling in siblings.into_iter().filter(|s| *s != path.model()) {
            let status = scene.model(sibling).status();
            let keep = status.is_selected()
                || status == ModelStatus::DescendantShown
                || status == ModelStatus::HiddenByUser;
            if !keep {
                scene.set_status(sibling, ModelStatus::Unselected);
            }
        }
    }

    let status = if is_primary {
        ModelStatus::Primary
    } else {
        ModelStatus::Secondary
    };
    scene.set_status(path.model(), status);
}
