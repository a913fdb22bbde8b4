//! Scene state management
//!
//! The model tree lives in an arena addressed by [`ModelId`] handles. The
//! root owns its children; detached nodes stay in the arena so commands can
//! put the same instance back on undo or redo.

mod lookup;
mod model;
mod names;
mod tree_ops;

pub use model::{Model, ModelId, ModelKind, ModelStatus, ModelTemplate};
pub use names::NameManager;

/// Model tree with a unique-name authority and a mutation counter.
#[derive(Debug, Clone)]
pub struct Scene {
    models: Vec<Model>,
    root: ModelId,
    names: NameManager,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl Scene {
    pub fn new() -> Self {
        let root = ModelId(0);
        Self {
            models: vec![Model::new(root, "Root".to_string(), ModelKind::Root)],
            root,
            names: NameManager::new(),
            version: 0,
        }
    }

    pub fn root(&self) -> ModelId {
        self.root
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bump version after a change made through `model_mut`
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }

    pub fn names(&self) -> &NameManager {
        &self.names
    }

    /// Get a model by handle. Handles are only minted by this scene, so an
    /// unknown handle is a programming error.
    pub fn model(&self, id: ModelId) -> &Model {
        &self.models[id.index()]
    }

    pub fn model_mut(&mut self, id: ModelId) -> &mut Model {
        &mut self.models[id.index()]
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.index())
    }

    /// Allocate a detached model. Its name is registered once it is attached.
    pub fn create_model(&mut self, name: impl Into<String>, kind: ModelKind) -> ModelId {
        let id = ModelId(self.models.len() as u32);
        self.models.push(Model::new(id, name.into(), kind));
        id
    }

    /// True when the model is reachable from the root.
    pub fn is_attached(&self, id: ModelId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.model(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub(crate) fn set_status(&mut self, id: ModelId, status: ModelStatus) {
        self.models[id.index()].status = status;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
