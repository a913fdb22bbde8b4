//! Ordered set of selected paths

use super::path::SelPath;
use crate::state::scene::ModelId;

/// Selected paths in order, the first being the primary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<SelPath>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: SelPath) -> Self {
        Self { paths: vec![path] }
    }

    pub fn from_paths(paths: impl IntoIterator<Item = SelPath>) -> Self {
        let mut selection = Self::new();
        for path in paths {
            selection.add(path);
        }
        selection
    }

    /// Append a path unless an equal one is already present.
    pub fn add(&mut self, path: SelPath) {
        if !self.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn has_any(&self) -> bool {
        !self.paths.is_empty()
    }

    pub fn count(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> &[SelPath] {
        &self.paths
    }

    pub fn primary(&self) -> Option<&SelPath> {
        self.paths.first()
    }

    pub fn contains(&self, path: &SelPath) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// True when some entry addresses `model`.
    pub fn contains_model(&self, model: ModelId) -> bool {
        self.paths.iter().any(|p| p.model() == model)
    }

    /// True when some entry is a strict ancestor of `path`.
    pub fn has_ancestor_of(&self, path: &SelPath) -> bool {
        self.paths.iter().any(|p| p.is_ancestor_of(path))
    }

    /// True when `path` equals, contains or is contained by some entry.
    pub fn conflicts_with(&self, path: &SelPath) -> bool {
        self.paths.iter().any(|p| p.conflicts_with(path))
    }

    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.paths.iter().map(|p| p.model())
    }

    /// Remove conflicting entries; later entries win over earlier ones.
    ///
    /// The survivors keep their original relative order.
    pub fn cleaned(&self) -> Selection {
        let mut kept: Vec<SelPath> = Vec::with_capacity(self.paths.len());
        for path in self.paths.iter().rev() {
            if !kept.iter().any(|k| k.conflicts_with(path)) {
                kept.push(path.clone());
            }
        }
        kept.reverse();
        Selection { paths: kept }
    }

    /// True when no two entries are equal or related by ancestry.
    pub fn is_clean(&self) -> bool {
        self.paths.iter().enumerate().all(|(i, a)| {
            self.paths
                .iter()
                .skip(i + 1)
                .all(|b| !a.conflicts_with(b))
        })
    }
}

impl FromIterator<SelPath> for Selection {
    fn from_iter<I: IntoIterator<Item = SelPath>>(iter: I) -> Self {
        Self::from_paths(iter)
    }
}
