//! Value types shared by the scene tree and the persisted command records.
//!
//! Everything here is plain data: it serializes with serde and carries no
//! reference into the live model tree.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Unique, user-visible name of a model in the scene.
pub type ModelName = String;

// ── Appearance ─────────────────────────────────────────────────

/// Linear RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// True when every channel lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Hex form used in descriptions, e.g. `#ff8000`.
    pub fn to_hex(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.8, 0.8, 0.8)
    }
}

// ── Placement ──────────────────────────────────────────────────

/// Scale, rotation and translation of a model relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

// ── Shape parameters ───────────────────────────────────────────

/// 2D profile used by extruded and surface-of-revolution models and by bevels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub points: Vec<Vec2>,
}

impl Profile {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Unit square, the default cross-section of an extruded model.
    pub fn square() -> Self {
        Self::new(vec![
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
            Vec2::new(0.5, 0.5),
            Vec2::new(-0.5, 0.5),
        ])
    }

    /// Open quarter arc, the default revolution profile.
    pub fn open_arc() -> Self {
        Self::new(vec![
            Vec2::new(0.0, 0.5),
            Vec2::new(0.35, 0.35),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.35, -0.35),
            Vec2::new(0.0, -0.5),
        ])
    }

    /// A closed profile needs a polygon of at least three points.
    pub fn is_valid_closed(&self) -> bool {
        self.points.len() >= 3 && self.points.iter().all(|p| p.is_finite())
    }

    /// An open profile needs at least its two end points.
    pub fn is_valid_open(&self) -> bool {
        self.points.len() >= 2 && self.points.iter().all(|p| p.is_finite())
    }
}

/// Edge bevel applied by a beveled model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bevel {
    /// Open profile of the bevel edge; empty means no bevel.
    pub profile: Profile,
    pub scale: f32,
    /// Edges whose dihedral angle exceeds this (degrees) are left sharp.
    pub max_angle: f32,
}

impl Default for Bevel {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            scale: 1.0,
            max_angle: 120.0,
        }
    }
}

impl Bevel {
    pub fn is_valid(&self) -> Result<(), String> {
        if self.scale <= 0.0 {
            return Err(format!("Bevel scale must be positive, got {}", self.scale));
        }
        if !(0.0..=180.0).contains(&self.max_angle) {
            return Err(format!(
                "Bevel max angle must be within 0-180 degrees, got {}",
                self.max_angle
            ));
        }
        if !self.profile.points.is_empty() && !self.profile.is_valid_open() {
            return Err("Bevel profile needs at least 2 points".to_string());
        }
        Ok(())
    }
}

/// Axis, center, angle and offset of a bend or twist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    pub axis: Vec3,
    pub center: Vec3,
    /// Degrees.
    pub angle: f32,
    pub offset: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            axis: Vec3::Y,
            center: Vec3::ZERO,
            angle: 0.0,
            offset: 0.0,
        }
    }
}

impl Spin {
    pub fn is_valid(&self) -> Result<(), String> {
        if self.axis.length_squared() <= f32::EPSILON {
            return Err("Spin axis must be non-zero".to_string());
        }
        if !self.angle.is_finite() || !self.offset.is_finite() {
            return Err("Spin angle and offset must be finite".to_string());
        }
        Ok(())
    }
}

// ── Model kinds ────────────────────────────────────────────────

/// Kind of primitive a creation command builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    #[default]
    Box,
    Cylinder,
    Sphere,
    Torus,
    Text,
    Extruded,
    RevSurf,
}

impl PrimitiveType {
    /// Prefix used when generating model names.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            PrimitiveType::Box => "Box",
            PrimitiveType::Cylinder => "Cylinder",
            PrimitiveType::Sphere => "Sphere",
            PrimitiveType::Torus => "Torus",
            PrimitiveType::Text => "Text",
            PrimitiveType::Extruded => "Extruded",
            PrimitiveType::RevSurf => "RevSurf",
        }
    }

    pub fn all() -> &'static [PrimitiveType] {
        &[
            PrimitiveType::Box,
            PrimitiveType::Cylinder,
            PrimitiveType::Sphere,
            PrimitiveType::Torus,
            PrimitiveType::Text,
            PrimitiveType::Extruded,
            PrimitiveType::RevSurf,
        ]
    }
}

/// Leaf shape of a model together with its type-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Box,
    Cylinder {
        top_radius: f32,
        bottom_radius: f32,
    },
    Sphere,
    Torus {
        inner_radius: f32,
        outer_radius: f32,
    },
    Text {
        text: String,
    },
    Extruded {
        profile: Profile,
    },
    RevSurf {
        profile: Profile,
        sweep_angle: f32,
    },
    Imported {
        path: String,
    },
}

impl Primitive {
    /// Primitive with default parameters for the given type.
    pub fn from_type(primitive_type: PrimitiveType) -> Self {
        match primitive_type {
            PrimitiveType::Box => Primitive::Box,
            PrimitiveType::Cylinder => Primitive::Cylinder {
                top_radius: 1.0,
                bottom_radius: 1.0,
            },
            PrimitiveType::Sphere => Primitive::Sphere,
            PrimitiveType::Torus => Primitive::Torus {
                inner_radius: 0.2,
                outer_radius: 1.0,
            },
            PrimitiveType::Text => Primitive::Text {
                text: "A".to_string(),
            },
            PrimitiveType::Extruded => Primitive::Extruded {
                profile: Profile::square(),
            },
            PrimitiveType::RevSurf => Primitive::RevSurf {
                profile: Profile::open_arc(),
                sweep_angle: 360.0,
            },
        }
    }

    pub fn name_prefix(&self) -> &'static str {
        match self {
            Primitive::Box => "Box",
            Primitive::Cylinder { .. } => "Cylinder",
            Primitive::Sphere => "Sphere",
            Primitive::Torus { .. } => "Torus",
            Primitive::Text { .. } => "Text",
            Primitive::Extruded { .. } => "Extruded",
            Primitive::RevSurf { .. } => "RevSurf",
            Primitive::Imported { .. } => "Imported",
        }
    }
}

/// CSG operation of a combined model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsgOperation {
    Union,
    Intersection,
    Difference,
}

/// How a combined model merges its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombinationType {
    Csg { operation: CsgOperation },
    Hull,
}

impl Default for CombinationType {
    fn default() -> Self {
        CombinationType::Csg {
            operation: CsgOperation::Union,
        }
    }
}

impl CombinationType {
    /// Fewest operands a combined model of this type may have.
    pub fn min_child_count(&self) -> usize {
        match self {
            CombinationType::Csg { .. } => 2,
            CombinationType::Hull => 1,
        }
    }

    pub fn name_prefix(&self) -> &'static str {
        match self {
            CombinationType::Csg {
                operation: CsgOperation::Union,
            } => "Union",
            CombinationType::Csg {
                operation: CsgOperation::Intersection,
            } => "Intersection",
            CombinationType::Csg {
                operation: CsgOperation::Difference,
            } => "Difference",
            CombinationType::Hull => "Hull",
        }
    }
}

/// Single-operand derived model a convert command wraps a model in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionType {
    #[default]
    Bevel,
    Bend,
    Twist,
    Mirror,
}

impl ConversionType {
    pub fn name_prefix(&self) -> &'static str {
        match self {
            ConversionType::Bevel => "Beveled",
            ConversionType::Bend => "Bent",
            ConversionType::Twist => "Twisted",
            ConversionType::Mirror => "Mirrored",
        }
    }
}
