//! Unique model name authority

use std::collections::HashSet;

/// Tracks the names of every model attached to the tree.
#[derive(Debug, Clone, Default)]
pub struct NameManager {
    names: HashSet<String>,
}

impl NameManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Register a name. Registering a name twice breaks uniqueness and is fatal.
    pub fn add(&mut self, name: &str) {
        let inserted = self.names.insert(name.to_string());
        assert!(inserted, "model name {name:?} is already in use");
    }

    pub fn remove(&mut self, name: &str) {
        self.names.remove(name);
    }

    /// Smallest unused `"{prefix}_{n}"` with `n >= 1`.
    pub fn create(&self, prefix: &str) -> String {
        self.create_avoiding(prefix, &HashSet::new())
    }

    /// Like [`create`](Self::create), also skipping names in `reserved`.
    pub fn create_avoiding(&self, prefix: &str, reserved: &HashSet<String>) -> String {
        (1..)
            .map(|n| format!("{prefix}_{n}"))
            .find(|name| !self.contains(name) && !reserved.contains(name))
            .unwrap_or_default()
    }

    /// Name for a copy of `base`: `"{base}_A"` through `"{base}_Z"`, then numeric.
    pub fn create_clone(&self, base: &str, reserved: &HashSet<String>) -> String {
        let is_free = |name: &String| !self.contains(name) && !reserved.contains(name);
        ('A'..='Z')
            .map(|suffix| format!("{base}_{suffix}"))
            .find(is_free)
            .unwrap_or_else(|| self.create_avoiding(base, reserved))
    }
}
