//! View-frustum culling against axis-aligned boxes.
//!
//! Planes are extracted from the combined clip matrix
//! (`projection * model_view`). The model-view matrix is expected to be
//! camera-relative (eye at the origin); boxes are translated by the camera
//! position before testing so that large world coordinates never reach f32.
//!
//! # Classification
//!
//! ```text
//! Outside  - the box is entirely behind at least one plane (never visible)
//! Partial  - the box straddles at least one plane
//! Inside   - every corner is in front of every plane
//! ```
//!
//! The test is conservative for `Outside` (a box is only rejected when a
//! whole plane separates it) and exact for `Inside` (all corners are inside
//! a convex volume). Because `Inside` is a statement about all corners, any
//! sub-box of an `Inside` box is also `Inside`; octree traversal relies on
//! this to skip tests below a fully-contained branch.

use glam::{DVec3, Mat4, Vec3, Vec4};

use crate::bounds::Aabb;
use crate::constants::{FRUSTUM_OFFSET_STEP, MAX_FRUSTUM_OFFSET_STEPS};

/// Result of a box-vs-frustum test.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intersection {
  Outside,
  Partial,
  Inside,
}

impl Intersection {
  /// True for `Partial` or `Inside`.
  #[inline]
  pub fn is_visible(self) -> bool {
    !matches!(self, Intersection::Outside)
  }
}

/// Six-plane view frustum anchored at a world-space camera position.
#[derive(Clone, Debug)]
pub struct Frustum {
  /// Left, right, bottom, top, near, far. Inside when `dot(n, p) + w >= 0`.
  planes: [Vec4; 6],
  /// Forward axis of the clip matrix, used to pull the camera back.
  view_vector: Vec3,
  camera: DVec3,
}

impl Frustum {
  /// Build from a camera-relative model-view matrix and a projection matrix.
  ///
  /// The camera position defaults to the origin; call
  /// [`prepare`](Self::prepare) before testing world-space boxes.
  pub fn new(model_view: Mat4, projection: Mat4) -> Self {
    let clip = projection * model_view;
    let (r0, r1, r2, r3) = (clip.row(0), clip.row(1), clip.row(2), clip.row(3));
    Self {
      planes: [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r3 + r2, r3 - r2],
      view_vector: r2.truncate(),
      camera: DVec3::ZERO,
    }
  }

  /// Set the world-space camera position boxes are tested relative to.
  pub fn prepare(&mut self, camera: DVec3) {
    self.camera = camera;
  }

  /// Builder form of [`prepare`](Self::prepare).
  #[must_use]
  pub fn at(mut self, camera: DVec3) -> Self {
    self.prepare(camera);
    self
  }

  /// Camera position in world space.
  #[inline]
  pub fn camera(&self) -> DVec3 {
    self.camera
  }

  /// Pull the virtual camera back along the view axis until the
  /// `offset`-aligned cube around the real camera lies fully inside.
  ///
  /// Sections containing the camera then never get culled by a near plane
  /// that cuts through them. The adjustment is anisotropic: only the view
  /// axis moves. Bounded by [`MAX_FRUSTUM_OFFSET_STEPS`].
  #[must_use]
  pub fn offset_to_fully_include_camera_cube(mut self, offset: i32) -> Self {
    let offset = f64::from(offset.max(1));
    let cube = Aabb {
      min: (self.camera / offset).floor() * offset,
      max: (self.camera / offset).ceil() * offset,
    };
    let step = self.view_vector.as_dvec3() * f64::from(FRUSTUM_OFFSET_STEP);
    for _ in 0..MAX_FRUSTUM_OFFSET_STEPS {
      if self.cube_in_frustum(&cube) == Intersection::Inside {
        break;
      }
      self.camera -= step;
    }
    self
  }

  /// Classify a world-space box.
  pub fn cube_in_frustum(&self, aabb: &Aabb) -> Intersection {
    let min = (aabb.min - self.camera).as_vec3();
    let max = (aabb.max - self.camera).as_vec3();
    self.intersect_relative(min, max)
  }

  /// True unless the box is entirely outside.
  #[inline]
  pub fn is_visible(&self, aabb: &Aabb) -> bool {
    self.cube_in_frustum(aabb).is_visible()
  }

  fn intersect_relative(&self, min: Vec3, max: Vec3) -> Intersection {
    let mut inside = true;
    for plane in &self.planes {
      let normal = plane.truncate();
      // Corner furthest along the normal decides "outside", the nearest one
      // decides "inside".
      let far = Vec3::select(normal.cmplt(Vec3::ZERO), min, max);
      if normal.dot(far) < -plane.w {
        return Intersection::Outside;
      }
      let near = Vec3::select(normal.cmplt(Vec3::ZERO), max, min);
      inside &= normal.dot(near) >= -plane.w;
    }
    if inside {
      Intersection::Inside
    } else {
      Intersection::Partial
    }
  }
}

#[cfg(test)]
#[path = "frustum_test.rs"]
mod frustum_test;
