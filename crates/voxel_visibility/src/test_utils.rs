//! Test fixtures: section grids, cameras and frustums.

use std::sync::Arc;

use glam::{DVec3, Mat4};

use crate::frustum::Frustum;
use crate::grid::SectionGrid;
use crate::types::{CameraSnapshot, LevelHeight, SectionPos, VisibilitySet};

/// Grid with every column (and the neighbor ring) loaded and every section
/// compiled with `visibility`.
pub fn loaded_grid(
  view_distance: i32,
  height: LevelHeight,
  center: SectionPos,
  visibility: VisibilitySet,
) -> Arc<SectionGrid> {
  let grid = SectionGrid::new(view_distance, height, center);
  grid.load_all_columns();
  grid.compile_all(visibility);
  Arc::new(grid)
}

pub fn camera_at(x: f64, y: f64, z: f64) -> CameraSnapshot {
  CameraSnapshot::new(DVec3::new(x, y, z))
}

/// Orthographic frustum containing everything within ±10000 blocks.
pub fn everything(camera: &CameraSnapshot) -> Frustum {
  let projection = Mat4::orthographic_rh_gl(-1.0e4, 1.0e4, -1.0e4, 1.0e4, -1.0e4, 1.0e4);
  Frustum::new(Mat4::IDENTITY, projection).at(camera.position)
}

/// Frustum covering only `x >= camera.x`.
pub fn facing_positive_x(camera: &CameraSnapshot) -> Frustum {
  let projection = Mat4::orthographic_rh_gl(0.0, 1.0e4, -1.0e4, 1.0e4, -1.0e4, 1.0e4);
  Frustum::new(Mat4::IDENTITY, projection).at(camera.position)
}
