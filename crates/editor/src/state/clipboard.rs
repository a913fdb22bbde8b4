//! Clipboard of copied model subtrees

use crate::state::scene::ModelTemplate;

/// Value copies of models. Copying replaces the whole content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    models: Vec<ModelTemplate>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, models: Vec<ModelTemplate>) {
        self.models = models;
    }

    /// Copied subtrees, one per copied model.
    pub fn models(&self) -> &[ModelTemplate] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Total number of models a paste would create.
    pub fn model_count(&self) -> usize {
        self.models.iter().map(|m| m.model_count()).sum()
    }
}
