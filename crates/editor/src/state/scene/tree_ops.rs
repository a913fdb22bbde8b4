//! Insert/remove/replace operations on the model tree

use super::{ModelId, Scene};

impl Scene {
    /// Append `child` to the children of `parent`.
    pub fn add_child(&mut self, parent: ModelId, child: ModelId) {
        let index = self.model(parent).children.len();
        self.insert_child(parent, index, child);
    }

    /// Insert a detached model as child `index` of `parent`.
    ///
    /// Names of the inserted subtree are registered when `parent` is attached.
    pub fn insert_child(&mut self, parent: ModelId, index: usize, child: ModelId) {
        assert!(
            self.model(child).parent.is_none(),
            "model {} is already a child of another model",
            self.model(child).name
        );
        assert_ne!(child, self.root(), "the root cannot become a child");
        let count = self.model(parent).children.len();
        assert!(index <= count, "child index {index} out of range 0..={count}");

        self.model_mut(parent).children.insert(index, child);
        self.model_mut(child).parent = Some(parent);
        if self.is_attached(parent) {
            self.register_names(child);
        }
        self.notify_mutated();
    }

    /// Detach child `index` of `parent` and return it.
    pub fn remove_child(&mut self, parent: ModelId, index: usize) -> ModelId {
        let count = self.model(parent).children.len();
        assert!(index < count, "child index {index} out of range 0..{count}");

        let attached = self.is_attached(parent);
        let child = self.model_mut(parent).children.remove(index);
        if attached {
            self.unregister_names(child);
        }
        self.model_mut(child).parent = None;
        self.notify_mutated();
        child
    }

    /// Detach a model from wherever it is, returning its former parent and index.
    pub fn detach(&mut self, id: ModelId) -> (ModelId, usize) {
        let parent = self
            .parent_of(id)
            .unwrap_or_else(|| panic!("model {} has no parent", self.model(id).name));
        let index = self
            .child_index(parent, id)
            .unwrap_or_else(|| panic!("model {} missing from its parent", self.model(id).name));
        self.remove_child(parent, index);
        (parent, index)
    }

    /// Swap child `index` of `parent` for `new_child`, returning the old child.
    pub fn replace_child(&mut self, parent: ModelId, index: usize, new_child: ModelId) -> ModelId {
        let old = self.remove_child(parent, index);
        self.insert_child(parent, index, new_child);
        old
    }

    /// Move a child of `parent` from one index to another.
    pub fn move_child(&mut self, parent: ModelId, from: usize, to: usize) {
        let child = self.remove_child(parent, from);
        self.insert_child(parent, to, child);
    }

    /// Rename a model, keeping the name registry in sync.
    pub fn rename(&mut self, id: ModelId, new_name: &str) {
        if self.is_attached(id) {
            let old = self.model(id).name.clone();
            self.names.remove(&old);
            self.names.add(new_name);
        }
        self.model_mut(id).name = new_name.to_string();
        self.notify_mutated();
    }

    fn register_names(&mut self, id: ModelId) {
        for model in self.subtree(id) {
            self.names.add(&self.models[model.index()].name);
        }
    }

    fn unregister_names(&mut self, id: ModelId) {
        for model in self.subtree(id) {
            self.names.remove(&self.models[model.index()].name);
        }
    }
}
