//! Session-wide display state that commands and toggles share

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Point and direction used to place new models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointTarget {
    pub position: Vec3,
    pub direction: Vec3,
}

/// Toggles and the point target.
///
/// This is the authoritative copy. Undoing a point-target change writes
/// here directly, so any cached toggle state must be re-read from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    edges_shown: bool,
    build_volume_visible: bool,
    point_target: Option<PointTarget>,
    point_target_visible: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edges_shown(&self) -> bool {
        self.edges_shown
    }

    pub fn set_edges_shown(&mut self, shown: bool) {
        self.edges_shown = shown;
    }

    pub fn build_volume_visible(&self) -> bool {
        self.build_volume_visible
    }

    pub fn set_build_volume_visible(&mut self, visible: bool) {
        self.build_volume_visible = visible;
    }

    pub fn point_target(&self) -> Option<PointTarget> {
        self.point_target
    }

    pub fn point_target_visible(&self) -> bool {
        self.point_target_visible
    }

    pub fn set_point_target_visible(&mut self, visible: bool) {
        self.point_target_visible = visible && self.point_target.is_some();
    }

    /// Place (or clear) the point target, returning the previous one and its visibility.
    pub fn replace_point_target(
        &mut self,
        target: Option<PointTarget>,
        visible: bool,
    ) -> (Option<PointTarget>, bool) {
        let previous = (self.point_target, self.point_target_visible);
        self.point_target = target;
        self.point_target_visible = visible && target.is_some();
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_target_visibility_requires_target() {
        let mut session = SessionState::new();
        session.set_point_target_visible(true);
        assert!(!session.point_target_visible());

        let target = PointTarget {
            position: Vec3::ZERO,
            direction: Vec3::Z,
        };
        let previous = session.replace_point_target(Some(target), true);
        assert_eq!(previous, (None, false));
        assert!(session.point_target_visible());
    }
}
