//! Model nodes stored in the scene arena

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{Bevel, Color, CombinationType, ConversionType, Primitive, Spin, Transform};
use uuid::Uuid;

/// Stable handle of a model in the scene arena.
///
/// Handles are never reused. A model removed from the tree keeps its handle
/// so it can be reinserted later as the same instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub(crate) u32);

impl ModelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node selection/visibility status, driven by the selection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    /// Never visited by selection logic.
    #[default]
    Unknown,
    /// Shown and selectable.
    Unselected,
    /// The focus of the selection.
    Primary,
    /// Selected along with the primary.
    Secondary,
    /// Hidden explicitly by the user.
    HiddenByUser,
    /// Hidden because an ancestor is shown.
    AncestorShown,
    /// Hidden because a descendant is shown or selected.
    DescendantShown,
}

impl ModelStatus {
    pub fn is_selected(self) -> bool {
        matches!(self, ModelStatus::Primary | ModelStatus::Secondary)
    }

    pub fn is_shown(self) -> bool {
        self == ModelStatus::Unselected || self.is_selected()
    }
}

/// What a model is, together with its type-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Root,
    Primitive(Primitive),
    Combined(CombinationType),
    Beveled(Bevel),
    Bent(Spin),
    Twisted(Spin),
    Mirrored { plane_normal: Vec3 },
}

impl ModelKind {
    /// Derived kind a convert command wraps an operand in.
    pub fn from_conversion(conversion: ConversionType) -> Self {
        match conversion {
            ConversionType::Bevel => ModelKind::Beveled(Bevel::default()),
            ConversionType::Bend => ModelKind::Bent(Spin::default()),
            ConversionType::Twist => ModelKind::Twisted(Spin::default()),
            ConversionType::Mirror => ModelKind::Mirrored {
                plane_normal: Vec3::X,
            },
        }
    }

    /// Fewest children this kind may be left with.
    pub fn min_child_count(&self) -> usize {
        match self {
            ModelKind::Root | ModelKind::Primitive(_) => 0,
            ModelKind::Combined(combination) => combination.min_child_count(),
            ModelKind::Beveled(_)
            | ModelKind::Bent(_)
            | ModelKind::Twisted(_)
            | ModelKind::Mirrored { .. } => 1,
        }
    }

    /// True for kinds that operate on child models.
    pub fn has_operands(&self) -> bool {
        !matches!(self, ModelKind::Root | ModelKind::Primitive(_))
    }

    pub fn is_conversion(&self, conversion: ConversionType) -> bool {
        matches!(
            (self, conversion),
            (ModelKind::Beveled(_), ConversionType::Bevel)
                | (ModelKind::Bent(_), ConversionType::Bend)
                | (ModelKind::Twisted(_), ConversionType::Twist)
                | (ModelKind::Mirrored { .. }, ConversionType::Mirror)
        )
    }

    /// Short type label for descriptions and inspection output.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Root => "Root",
            ModelKind::Primitive(primitive) => primitive.name_prefix(),
            ModelKind::Combined(combination) => combination.name_prefix(),
            ModelKind::Beveled(_) => "Beveled",
            ModelKind::Bent(_) => "Bent",
            ModelKind::Twisted(_) => "Twisted",
            ModelKind::Mirrored { .. } => "Mirrored",
        }
    }
}

/// A node of the model tree.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) id: ModelId,
    pub(crate) instance: Uuid,
    pub(crate) name: String,
    pub(crate) parent: Option<ModelId>,
    pub(crate) children: Vec<ModelId>,
    pub(crate) status: ModelStatus,
    pub kind: ModelKind,
    pub color: Color,
    /// Tessellation complexity in `[0, 1]`.
    pub complexity: f32,
    pub transform: Transform,
    /// Set when the model's source data could not be used.
    pub invalid_reason: Option<String>,
}

impl Model {
    pub(crate) fn new(id: ModelId, name: String, kind: ModelKind) -> Self {
        Self {
            id,
            instance: Uuid::new_v4(),
            name,
            parent: None,
            children: Vec::new(),
            status: ModelStatus::Unknown,
            kind,
            color: Color::default(),
            complexity: 0.3,
            transform: Transform::new(),
            invalid_reason: None,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Identity of this node instance; survives removal and reinsertion.
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ModelId> {
        self.parent
    }

    pub fn children(&self) -> &[ModelId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_reason.is_none()
    }
}

/// Detached value copy of a model subtree, as stored on the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTemplate {
    pub name: String,
    pub kind: ModelKind,
    pub color: Color,
    pub complexity: f32,
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ModelTemplate>,
}

impl ModelTemplate {
    /// Number of models in this subtree, including itself.
    pub fn model_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.model_count()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CsgOperation;

    #[test]
    fn test_status_predicates() {
        assert!(ModelStatus::Primary.is_selected());
        assert!(ModelStatus::Secondary.is_selected());
        assert!(!ModelStatus::Unselected.is_selected());
        assert!(ModelStatus::Unselected.is_shown());
        assert!(ModelStatus::Primary.is_shown());
        assert!(!ModelStatus::AncestorShown.is_shown());
        assert!(!ModelStatus::HiddenByUser.is_shown());
        assert!(!ModelStatus::Unknown.is_shown());
    }

    #[test]
    fn test_min_child_counts() {
        let union = ModelKind::Combined(CombinationType::Csg {
            operation: CsgOperation::Union,
        });
        assert_eq!(union.min_child_count(), 2);
        assert_eq!(ModelKind::Combined(CombinationType::Hull).min_child_count(), 1);
        assert_eq!(ModelKind::Beveled(Bevel::default()).min_child_count(), 1);
        assert_eq!(ModelKind::Primitive(Primitive::Box).min_child_count(), 0);
    }

    #[test]
    fn test_conversion_kinds() {
        let kind = ModelKind::from_conversion(ConversionType::Twist);
        assert!(kind.is_conversion(ConversionType::Twist));
        assert!(!kind.is_conversion(ConversionType::Bend));
        assert_eq!(kind.label(), "Twisted");
    }
}
