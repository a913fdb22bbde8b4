//! Root-to-model address of one node in the tree

use crate::state::scene::{ModelId, Scene};

/// Ordered handles from the tree root down to a target model.
///
/// Paths compare by handle identity, so two paths are equal only when they
/// address the very same nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelPath(Vec<ModelId>);

impl SelPath {
    /// Build a path from root-first handles. An empty path is fatal.
    pub fn new(ids: Vec<ModelId>) -> Self {
        assert!(!ids.is_empty(), "SelPath must contain at least the root");
        Self(ids)
    }

    pub fn ids(&self) -> &[ModelId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a path holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn root(&self) -> ModelId {
        self.0[0]
    }

    /// The model this path addresses.
    pub fn model(&self) -> ModelId {
        self.0[self.0.len() - 1]
    }

    /// True for a path of the form `[root, model]`.
    pub fn is_top_level(&self) -> bool {
        self.0.len() == 2
    }

    /// Strict prefix test.
    pub fn is_ancestor_of(&self, other: &SelPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_descendant_of(&self, other: &SelPath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Equal to, an ancestor of, or a descendant of `other`.
    pub fn conflicts_with(&self, other: &SelPath) -> bool {
        self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }

    /// Path to the parent, or `None` for the root path.
    pub fn parent_path(&self) -> Option<SelPath> {
        (self.0.len() > 1).then(|| SelPath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Handle of the parent model, or `None` for the root path.
    pub fn parent_model(&self) -> Option<ModelId> {
        (self.0.len() > 1).then(|| self.0[self.0.len() - 2])
    }

    /// Path extended by one child.
    pub fn child_path(&self, child: ModelId) -> SelPath {
        let mut ids = self.0.clone();
        ids.push(child);
        SelPath(ids)
    }

    /// Path to the top-level ancestor (or self), `None` for the root path.
    pub fn top_level_path(&self) -> Option<SelPath> {
        (self.0.len() > 1).then(|| SelPath(self.0[..2].to_vec()))
    }

    /// Ancestor handles from the parent up to the root, excluding the model.
    pub fn ancestors(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.0[..self.0.len() - 1].iter().rev().copied()
    }

    /// Model names below the root joined with `/`.
    pub fn display(&self, scene: &Scene) -> String {
        self.0[1..]
            .iter()
            .map(|id| scene.model(*id).name())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[u32]) -> SelPath {
        SelPath::new(ids.iter().map(|i| ModelId(*i)).collect())
    }

    #[test]
    fn test_model_and_root() {
        let p = path(&[0, 3, 7]);
        assert_eq!(p.root(), ModelId(0));
        assert_eq!(p.model(), ModelId(7));
        assert_eq!(p.parent_model(), Some(ModelId(3)));
        assert!(!p.is_top_level());
        assert!(path(&[0, 3]).is_top_level());
    }

    #[test]
    fn test_ancestor_is_strict_prefix() {
        let a = path(&[0, 1]);
        let b = path(&[0, 1, 2]);
        let c = path(&[0, 2]);
        assert!(a.is_ancestor_of(&b));
        assert!(b.is_descendant_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(!c.is_ancestor_of(&b));
        assert!(a.conflicts_with(&b));
        assert!(a.conflicts_with(&a.clone()));
        assert!(!a.conflicts_with(&c));
    }

    #[test]
    fn test_parent_and_top_level() {
        let p = path(&[0, 1, 2, 3]);
        assert_eq!(p.parent_path(), Some(path(&[0, 1, 2])));
        assert_eq!(p.top_level_path(), Some(path(&[0, 1])));
        assert_eq!(path(&[0]).parent_path(), None);
        assert_eq!(path(&[0, 1]).child_path(ModelId(9)), path(&[0, 1, 9]));
    }

    #[test]
    fn test_ancestors_order() {
        let p = path(&[0, 1, 2]);
        let ancestors: Vec<ModelId> = p.ancestors().collect();
        assert_eq!(ancestors, vec![ModelId(1), ModelId(0)]);
    }

    #[test]
    #[should_panic(expected = "at least the root")]
    fn test_empty_path_is_fatal() {
        SelPath::new(Vec::new());
    }
}
