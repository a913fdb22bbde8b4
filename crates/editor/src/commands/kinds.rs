//! Field records of every command type

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{Bevel, Color, CombinationType, ConversionType, PrimitiveType, Profile, Spin};

use crate::state::ModelTemplate;

/// Behavior shared by every command payload.
pub trait CommandSpec {
    /// Human-readable summary, a function of the field values only.
    fn description(&self) -> String;

    /// Construction-time check. The error explains what is wrong.
    fn validate(&self) -> Result<(), String>;

    fn has_undo_effect(&self) -> bool {
        true
    }

    fn has_redo_effect(&self) -> bool {
        true
    }

    /// True for commands with effects outside the history that later
    /// commands may depend on.
    fn should_be_added_as_orphan(&self) -> bool {
        false
    }
}

/// Readable list of affected models.
fn describe_models(names: &[String]) -> String {
    match names.len() {
        0 => "no models".to_string(),
        1..=3 => names.join(", "),
        n => format!("{n} models"),
    }
}

fn require_models(names: &[String]) -> Result<(), String> {
    if names.is_empty() {
        return Err("No model names given".to_string());
    }
    if let Some(empty) = names.iter().position(|n| n.is_empty()) {
        return Err(format!("Model name {empty} is empty"));
    }
    Ok(())
}

fn require_positive(what: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be positive, got {value}"))
    }
}

// ── Creation ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePrimitiveModelCommand {
    pub primitive_type: PrimitiveType,
    #[serde(default)]
    pub translation: Vec3,
    /// Generated on first execution when empty.
    #[serde(default)]
    pub result_name: String,
}

impl CommandSpec for CreatePrimitiveModelCommand {
    fn description(&self) -> String {
        if self.result_name.is_empty() {
            format!("Create {} model", self.primitive_type.name_prefix())
        } else {
            format!(
                "Create {} model {}",
                self.primitive_type.name_prefix(),
                self.result_name
            )
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !self.translation.is_finite() {
            return Err("Translation must be finite".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateImportedModelCommand {
    pub path: String,
    #[serde(default)]
    pub result_name: String,
}

impl CommandSpec for CreateImportedModelCommand {
    fn description(&self) -> String {
        format!("Import model from {}", self.path)
    }

    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("Import path is empty".to_string());
        }
        Ok(())
    }
}

// ── Structural ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCombinedModelCommand {
    pub model_names: Vec<String>,
    pub combination: CombinationType,
    #[serde(default)]
    pub result_name: String,
}

impl CommandSpec for CreateCombinedModelCommand {
    fn description(&self) -> String {
        format!(
            "Create {} of {}",
            self.combination.name_prefix(),
            describe_models(&self.model_names)
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        let min = self.combination.min_child_count();
        if self.model_names.len() < min {
            return Err(format!(
                "{} needs at least {min} models, got {}",
                self.combination.name_prefix(),
                self.model_names.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertModelCommand {
    pub model_names: Vec<String>,
    pub conversion: ConversionType,
    /// One generated name per converted model.
    #[serde(default)]
    pub result_names: Vec<String>,
}

impl CommandSpec for ConvertModelCommand {
    fn description(&self) -> String {
        format!(
            "Convert {} to {}",
            describe_models(&self.model_names),
            self.conversion.name_prefix()
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if !self.result_names.is_empty() && self.result_names.len() != self.model_names.len() {
            return Err(format!(
                "Expected {} result names, got {}",
                self.model_names.len(),
                self.result_names.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteCommand {
    pub model_names: Vec<String>,
}

impl CommandSpec for DeleteCommand {
    fn description(&self) -> String {
        format!("Delete {}", describe_models(&self.model_names))
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeOrderCommand {
    pub model_names: Vec<String>,
    /// Move towards the front of the sibling list instead of the back.
    pub is_previous: bool,
}

impl CommandSpec for ChangeOrderCommand {
    fn description(&self) -> String {
        let direction = if self.is_previous { "previous" } else { "next" };
        format!("Move {} {direction}", describe_models(&self.model_names))
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeNameCommand {
    pub old_name: String,
    pub new_name: String,
}

impl CommandSpec for ChangeNameCommand {
    fn description(&self) -> String {
        format!("Rename {} to {}", self.old_name, self.new_name)
    }

    fn validate(&self) -> Result<(), String> {
        if self.old_name.is_empty() || self.new_name.trim().is_empty() {
            return Err("Names must not be empty".to_string());
        }
        if self.old_name == self.new_name {
            return Err(format!("{} already has that name", self.old_name));
        }
        Ok(())
    }
}

// ── Clipboard ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyCommand {
    pub model_names: Vec<String>,
    /// What the first run put on the clipboard. Replays use it when the
    /// named models are gone, as for a copy orphaned by a discarded redo.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copied: Vec<ModelTemplate>,
}

impl CopyCommand {
    pub fn new(model_names: Vec<String>) -> Self {
        Self {
            model_names,
            copied: Vec::new(),
        }
    }
}

impl CommandSpec for CopyCommand {
    fn description(&self) -> String {
        format!("Copy {}", describe_models(&self.model_names))
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)
    }

    // The clipboard lives outside the history.
    fn has_undo_effect(&self) -> bool {
        false
    }

    fn has_redo_effect(&self) -> bool {
        false
    }

    fn should_be_added_as_orphan(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasteCommand {
    /// Model to paste into; the root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    /// Names of the pasted top models, generated on first execution.
    #[serde(default)]
    pub result_names: Vec<String>,
}

impl CommandSpec for PasteCommand {
    fn description(&self) -> String {
        let what = if self.result_names.is_empty() {
            "clipboard".to_string()
        } else {
            describe_models(&self.result_names)
        };
        match &self.parent_name {
            Some(parent) => format!("Paste {what} into {parent}"),
            None => format!("Paste {what}"),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.parent_name.as_deref() == Some("") {
            return Err("Parent name is empty".to_string());
        }
        Ok(())
    }
}

// ── Field changes ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeColorCommand {
    pub model_names: Vec<String>,
    pub new_color: Color,
}

impl CommandSpec for ChangeColorCommand {
    fn description(&self) -> String {
        format!(
            "Change color of {} to {}",
            describe_models(&self.model_names),
            self.new_color.to_hex()
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if !self.new_color.is_normalized() {
            return Err("Color channels must be within 0-1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeComplexityCommand {
    pub model_names: Vec<String>,
    pub new_complexity: f32,
}

impl CommandSpec for ChangeComplexityCommand {
    fn description(&self) -> String {
        format!(
            "Change complexity of {} to {:.2}",
            describe_models(&self.model_names),
            self.new_complexity
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if !(0.0..=1.0).contains(&self.new_complexity) {
            return Err(format!(
                "Complexity must be within 0-1, got {}",
                self.new_complexity
            ));
        }
        Ok(())
    }
}

/// Which cylinder radius a change applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CylinderRadius {
    #[default]
    Top,
    Bottom,
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeCylinderCommand {
    pub model_names: Vec<String>,
    pub which_radius: CylinderRadius,
    pub new_radius: f32,
}

impl CommandSpec for ChangeCylinderCommand {
    fn description(&self) -> String {
        let which = match self.which_radius {
            CylinderRadius::Top => "top radius",
            CylinderRadius::Bottom => "bottom radius",
            CylinderRadius::Both => "radius",
        };
        format!(
            "Change cylinder {which} of {} to {}",
            describe_models(&self.model_names),
            self.new_radius
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        require_positive("Cylinder radius", self.new_radius)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeTorusCommand {
    pub model_names: Vec<String>,
    pub is_inner_radius: bool,
    pub new_radius: f32,
}

impl CommandSpec for ChangeTorusCommand {
    fn description(&self) -> String {
        let which = if self.is_inner_radius { "inner" } else { "outer" };
        format!(
            "Change torus {which} radius of {} to {}",
            describe_models(&self.model_names),
            self.new_radius
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        require_positive("Torus radius", self.new_radius)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeTextCommand {
    pub model_names: Vec<String>,
    pub new_text: String,
}

impl CommandSpec for ChangeTextCommand {
    fn description(&self) -> String {
        format!(
            "Change text of {} to {:?}",
            describe_models(&self.model_names),
            self.new_text
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if self.new_text.is_empty() {
            return Err("Text must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBevelCommand {
    pub model_names: Vec<String>,
    pub new_bevel: Bevel,
}

impl CommandSpec for ChangeBevelCommand {
    fn description(&self) -> String {
        format!("Change bevel of {}", describe_models(&self.model_names))
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        self.new_bevel.is_valid()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeProfileCommand {
    pub model_names: Vec<String>,
    pub new_profile: Profile,
}

impl CommandSpec for ChangeProfileCommand {
    fn description(&self) -> String {
        format!("Change profile of {}", describe_models(&self.model_names))
    }

    // Whether the profile must be closed depends on the target model,
    // which the executor checks; two points is the floor for both.
    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if !self.new_profile.is_valid_open() {
            return Err("Profile needs at least 2 points".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSpinCommand {
    pub model_names: Vec<String>,
    pub new_spin: Spin,
}

impl CommandSpec for ChangeSpinCommand {
    fn description(&self) -> String {
        format!("Change spin of {}", describe_models(&self.model_names))
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        self.new_spin.is_valid()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateCommand {
    pub model_names: Vec<String>,
    /// Offset from where the models were when the command first ran.
    pub translation: Vec3,
}

impl CommandSpec for TranslateCommand {
    fn description(&self) -> String {
        let t = self.translation;
        format!(
            "Translate {} by ({}, {}, {})",
            describe_models(&self.model_names),
            t.x,
            t.y,
            t.z
        )
    }

    fn validate(&self) -> Result<(), String> {
        require_models(&self.model_names)?;
        if !self.translation.is_finite() {
            return Err("Translation must be finite".to_string());
        }
        Ok(())
    }
}

// ── Session ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePointTargetCommand {
    pub position: Vec3,
    pub direction: Vec3,
}

impl CommandSpec for ChangePointTargetCommand {
    fn description(&self) -> String {
        let p = self.position;
        format!("Place point target at ({}, {}, {})", p.x, p.y, p.z)
    }

    fn validate(&self) -> Result<(), String> {
        if !self.position.is_finite() {
            return Err("Point target position must be finite".to_string());
        }
        if !self.direction.is_finite() || self.direction.length_squared() <= f32::EPSILON {
            return Err("Point target direction must be non-zero".to_string());
        }
        Ok(())
    }
}
