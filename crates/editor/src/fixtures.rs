//! Factory functions for test scenes.
//!
//! Scenes are built through commands on a [`Harness`], so each fixture also
//! leaves a realistic history behind.

use std::path::Path;

use shared::{CombinationType, ConversionType, PrimitiveType};

use crate::commands::{
    Command, CommandKind, ConvertModelCommand, CreateCombinedModelCommand,
};
use crate::harness::Harness;
use crate::persistence::session_to_json;
use crate::state::{ImportSettings, ModelLoader};

// ── Scenes ──────────────────────────────────────────────────────

/// `Box_1`, `Box_2`, `Box_3` at the top level, nothing selected.
pub fn three_boxes() -> Harness {
    let mut h = Harness::new();
    for _ in 0..3 {
        h.create_box();
    }
    h.deselect_all();
    h
}

/// ```text
/// Union_1
/// ├── Box_1
/// └── Beveled_1
///     └── Sphere_1
/// Cylinder_1
/// ```
/// Nothing selected.
pub fn nested_scene() -> Harness {
    let mut h = Harness::new();
    h.create_box();
    h.create_primitive(PrimitiveType::Sphere);
    h.execute(ConvertModelCommand {
        model_names: vec!["Sphere_1".into()],
        conversion: ConversionType::Bevel,
        result_names: Vec::new(),
    })
    .unwrap_or_else(|e| panic!("fixture conversion failed: {e}"));
    h.execute(CreateCombinedModelCommand {
        model_names: vec!["Box_1".into(), "Beveled_1".into()],
        combination: CombinationType::default(),
        result_name: String::new(),
    })
    .unwrap_or_else(|e| panic!("fixture combination failed: {e}"));
    h.create_primitive(PrimitiveType::Cylinder);
    h.deselect_all();
    h
}

// ── Sessions ────────────────────────────────────────────────────

/// Session JSON for the given commands with all of them done.
pub fn session_of(kinds: impl IntoIterator<Item = CommandKind>) -> String {
    let commands: Vec<Command> = kinds.into_iter().map(Command::new).collect();
    session_to_json(&commands, commands.len())
        .unwrap_or_else(|e| panic!("fixture session failed to serialize: {e}"))
}

// ── Loaders ─────────────────────────────────────────────────────

/// Loader with a canned outcome, for import scenarios without files.
#[derive(Debug, Clone, Default)]
pub struct StubLoader {
    pub failure: Option<String>,
}

impl StubLoader {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
        }
    }
}

impl ModelLoader for StubLoader {
    fn load(&self, _path: &Path, _import: &ImportSettings) -> Result<(), String> {
        match &self.failure {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }
}
