//! Graph configuration.

use crate::constants::{
  ADVANCED_CULLING_DISTANCE, CEILED_SECTION_DIAGONAL, DEFAULT_CAMERA_CUBE_OFFSET, DEFAULT_CLOSE_DISTANCE,
};

/// Tuning parameters for the occlusion graph.
///
/// Distances are in world units (blocks).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphConfig {
  /// Use per-section face visibility to stop propagation through solid
  /// geometry, plus the distant line-of-sight test.
  pub smart_culling: bool,
  /// Per-axis distance from the camera section beyond which the distant
  /// line-of-sight test runs.
  pub advanced_culling_distance: f64,
  /// Ray-march step of the distant line-of-sight test.
  pub ray_step: f64,
  /// Margin for the "nearby" subset of visible sections.
  pub close_distance: i32,
  /// Cube size used when fitting the camera inside the conservative
  /// frustum of incremental propagation.
  pub camera_cube_offset: i32,
}

impl GraphConfig {
  pub const DEFAULT: Self = Self {
    smart_culling: true,
    advanced_culling_distance: ADVANCED_CULLING_DISTANCE,
    ray_step: CEILED_SECTION_DIAGONAL,
    close_distance: DEFAULT_CLOSE_DISTANCE,
    camera_cube_offset: DEFAULT_CAMERA_CUBE_OFFSET,
  };

  /// Pure flood fill: every loaded section in range is reachable.
  pub const NO_OCCLUSION: Self = Self {
    smart_culling: false,
    ..Self::DEFAULT
  };
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_presets() {
    assert_eq!(GraphConfig::default(), GraphConfig::DEFAULT);
    assert!(GraphConfig::DEFAULT.smart_culling);
    assert!(!GraphConfig::NO_OCCLUSION.smart_culling);
    assert_eq!(GraphConfig::NO_OCCLUSION.ray_step, 28.0);
  }
}
