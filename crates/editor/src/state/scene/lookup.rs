//! Lookup, path resolution and subtree copies

use std::collections::HashSet;

use super::{ModelId, ModelTemplate, Scene};
use crate::state::selection::SelPath;

impl Scene {
    /// The model and all of its descendants, pre-order.
    pub fn subtree(&self, id: ModelId) -> Vec<ModelId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.model(current).children.iter().rev().copied());
        }
        out
    }

    /// All descendants of a model, pre-order, excluding the model itself.
    pub fn descendants(&self, id: ModelId) -> Vec<ModelId> {
        let mut all = self.subtree(id);
        all.remove(0);
        all
    }

    pub fn parent_of(&self, id: ModelId) -> Option<ModelId> {
        self.model(id).parent
    }

    pub fn child_index(&self, parent: ModelId, child: ModelId) -> Option<usize> {
        self.model(parent).children.iter().position(|c| *c == child)
    }

    /// Direct children of the root.
    pub fn top_level_models(&self) -> &[ModelId] {
        self.model(self.root()).children()
    }

    pub fn top_level_paths(&self) -> Vec<SelPath> {
        let root = self.root();
        self.top_level_models()
            .iter()
            .map(|id| SelPath::new(vec![root, *id]))
            .collect()
    }

    /// Path from the root to an attached model.
    pub fn path_to(&self, id: ModelId) -> Option<SelPath> {
        let mut ids = vec![id];
        let mut current = id;
        while current != self.root() {
            current = self.model(current).parent?;
            ids.push(current);
        }
        ids.reverse();
        Some(SelPath::new(ids))
    }

    /// True when every step of `path` is still a parent/child link.
    pub fn is_valid_path(&self, path: &SelPath) -> bool {
        path.root() == self.root()
            && path
                .ids()
                .windows(2)
                .all(|pair| self.model(pair[1]).parent == Some(pair[0]))
    }

    /// Attached model with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<ModelId> {
        if !self.names.contains(name) {
            return None;
        }
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.model(*id).name == name)
    }

    pub fn find_path(&self, name: &str) -> Option<SelPath> {
        self.find_by_name(name).and_then(|id| self.path_to(id))
    }

    /// Resolve a model that must exist. A missing model means the caller
    /// skipped its applicability check, which is fatal.
    pub fn expect_path(&self, name: &str) -> SelPath {
        self.find_path(name)
            .unwrap_or_else(|| panic!("no model named {name:?} in the scene"))
    }

    /// Number of models attached below the root.
    pub fn attached_count(&self) -> usize {
        self.descendants(self.root()).len()
    }

    /// Deep value copy of a subtree.
    pub fn template_of(&self, id: ModelId) -> ModelTemplate {
        let model = self.model(id);
        ModelTemplate {
            name: model.name.clone(),
            kind: model.kind.clone(),
            color: model.color,
            complexity: model.complexity,
            transform: model.transform,
            invalid_reason: model.invalid_reason.clone(),
            children: model
                .children
                .iter()
                .map(|child| self.template_of(*child))
                .collect(),
        }
    }

    /// Build a detached copy of `template` named `name`.
    ///
    /// Descendants get clone names that avoid both registered names and
    /// `reserved`; every generated name is added to `reserved`.
    pub fn instantiate(
        &mut self,
        template: &ModelTemplate,
        name: String,
        reserved: &mut HashSet<String>,
    ) -> ModelId {
        reserved.insert(name.clone());
        let id = self.create_model(name, template.kind.clone());
        {
            let model = self.model_mut(id);
            model.color = template.color;
            model.complexity = template.complexity;
            model.transform = template.transform;
            model.invalid_reason = template.invalid_reason.clone();
        }
        for child in &template.children {
            let child_name = self.names.create_clone(&child.name, reserved);
            let child_id = self.instantiate(child, child_name, reserved);
            self.add_child(id, child_id);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::state::scene::{ModelKind, Scene};
    use shared::{CombinationType, Primitive};

    fn sample() -> (Scene, [super::ModelId; 3]) {
        let mut scene = Scene::new();
        let root = scene.root();
        let hull = scene.create_model("Hull_1", ModelKind::Combined(CombinationType::Hull));
        let a = scene.create_model("Box_1", ModelKind::Primitive(Primitive::Box));
        let b = scene.create_model("Box_2", ModelKind::Primitive(Primitive::Box));
        scene.add_child(hull, a);
        scene.add_child(root, hull);
        scene.add_child(root, b);
        (scene, [hull, a, b])
    }

    #[test]
    fn test_find_path_nested() {
        let (scene, [hull, a, _]) = sample();
        let path = scene.find_path("Box_1").unwrap();
        assert_eq!(path.ids(), &[scene.root(), hull, a]);
        assert_eq!(path.display(&scene), "Hull_1/Box_1");
        assert!(scene.is_valid_path(&path));
    }

    #[test]
    fn test_detached_models_are_not_found() {
        let (mut scene, [_, _, b]) = sample();
        scene.detach(b);
        assert!(scene.find_path("Box_2").is_none());
        assert!(scene.path_to(b).is_none());
        assert_eq!(scene.attached_count(), 2);
    }

    #[test]
    #[should_panic(expected = "no model named")]
    fn test_expect_path_missing_is_fatal() {
        let (scene, _) = sample();
        scene.expect_path("Nope");
    }

    #[test]
    fn test_template_and_instantiate_give_fresh_names() {
        let (mut scene, [hull, _, _]) = sample();
        let template = scene.template_of(hull);
        assert_eq!(template.model_count(), 2);

        let mut reserved = HashSet::new();
        let name = scene.names().create_clone("Hull_1", &reserved);
        let copy = scene.instantiate(&template, name, &mut reserved);
        let root = scene.root();
        scene.add_child(root, copy);

        assert_eq!(scene.model(copy).name(), "Hull_1_A");
        let child = scene.model(copy).children()[0];
        assert_eq!(scene.model(child).name(), "Box_1_A");
        assert_ne!(scene.model(copy).instance(), scene.model(hull).instance());
    }

    #[test]
    fn test_top_level_paths() {
        let (scene, [hull, _, b]) = sample();
        let tops: Vec<_> = scene.top_level_paths().iter().map(|p| p.model()).collect();
        assert_eq!(tops, vec![hull, b]);
    }
}
