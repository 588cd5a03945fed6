//! Boundary to the section storage and mesh compiler.
//!
//! The graph never owns sections. It addresses them by [`SectionPos`] and
//! asks a [`SectionSource`] about their state. Implementations are shared
//! between the render thread and the background rebuild, so every method
//! takes `&self` and must be thread safe.

use crate::types::{ChunkPos, Direction, LevelHeight, SectionPos};

/// Read access to the tracked section grid, plus the one write the graph
/// performs (`mark_empty`).
pub trait SectionSource: Send + Sync {
  /// Horizontal view distance in columns.
  fn view_distance(&self) -> i32;

  /// Vertical extent of the world.
  fn level_height(&self) -> LevelHeight;

  /// Section the tracked grid is centered on.
  fn center(&self) -> SectionPos;

  /// True if a section exists at `pos` in the tracked grid.
  fn contains(&self, pos: SectionPos) -> bool;

  /// True once the section and its six neighbors have their data loaded.
  fn has_all_neighbors(&self, pos: SectionPos) -> bool;

  /// Whether light entering through `from` can leave through `to`.
  ///
  /// Only meaningful once the section's mesh has been compiled; an
  /// uncompiled section reports `false` for every pair.
  fn faces_can_see_each_other(&self, pos: SectionPos, from: Direction, to: Direction) -> bool;

  /// True if the section is known to contain no geometry.
  fn is_known_empty(&self, pos: SectionPos) -> bool;

  /// Record that the section has no geometry, without compiling it.
  fn mark_empty(&self, pos: SectionPos);
}

/// Column-level view distance test.
///
/// Columns are in range when their rounded-square distance from the center,
/// measured from the center column's edge, is below `view_distance`. This
/// keeps the full `(2r + 1)²` square for small radii and trims corners for
/// larger ones.
pub fn is_in_view_distance(center: ChunkPos, view_distance: i32, column: ChunkPos) -> bool {
  let dx = i64::from(((column.x() - center.x()).abs() - 1).max(0));
  let dz = i64::from(((column.z() - center.z()).abs() - 1).max(0));
  let far = dx.max(dz);
  let near = dx.min(dz);
  let distance_sq = near * near + far * far;
  distance_sq < i64::from(view_distance) * i64::from(view_distance)
}

/// Section-level view distance test: the horizontal column test plus a
/// vertical limit of `view_distance` sections.
pub fn is_section_in_view(camera: SectionPos, view_distance: i32, pos: SectionPos) -> bool {
  is_in_view_distance(camera.column(), view_distance, pos.column())
    && (camera.y() - pos.y()).abs() <= view_distance
}
