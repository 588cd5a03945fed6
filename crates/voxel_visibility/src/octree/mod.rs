//! Section octree: a bounding-volume tree over reachable sections.
//!
//! The tree covers a camera-centered cube whose edge is the smallest power
//! of two (in sections) holding `2 * view_distance + 1` sections. Branches
//! halve their box per axis down to a two-section span; below that, sections
//! are stored directly as leaves.
//!
//! # Traversal
//!
//! [`Octree::visit`] walks depth first and classifies each node against the
//! frustum:
//!
//! ```text
//! Outside  -> prune the subtree
//! Inside   -> visit the subtree without further frustum tests
//! Partial  -> visit, test each child individually
//! ```
//!
//! Children are ordered per branch by [`AxisSorting`], so a depth-first walk
//! tends to reach sections near the camera before far ones.
//!
//! # Module Structure
//!
//! - [`node`]: `TreeNode` (Branch / Leaf) and child ordering

pub mod node;

use glam::{DVec3, IVec3};

use crate::bounds::{Aabb, BlockBox};
use crate::constants::SECTION_SIZE;
use crate::frustum::{Frustum, Intersection};
use crate::types::{LevelHeight, SectionPos};

pub use node::{AxisSorting, Branch, TreeNode};

/// Octree over the sections reachable in one graph snapshot.
pub struct Octree {
  root: TreeNode,
  bounds: BlockBox,
  camera_section_center: IVec3,
  len: usize,
}

impl Octree {
  /// Build an empty tree around the camera's section.
  ///
  /// When the tree is at least as tall as the world, it is anchored to the
  /// world floor instead of the camera.
  pub fn new(camera_section: SectionPos, view_distance: i32, height: LevelHeight) -> Self {
    let diameter = (view_distance.max(0) * 2 + 1) as u32;
    // Never smaller than a single leaf parent.
    let size_in_sections = diameter.next_power_of_two().max(2) as i32;
    let distance_to_edge = view_distance.max(0) * SECTION_SIZE;
    let edge = size_in_sections * SECTION_SIZE;

    let origin = camera_section.origin();
    let min_x = origin.x - distance_to_edge;
    let min_z = origin.z - distance_to_edge;
    let min_y = if size_in_sections >= height.section_count() {
      height.min_block_y()
    } else {
      origin.y - distance_to_edge
    };
    let min = IVec3::new(min_x, min_y, min_z);
    let bounds = BlockBox::new(min, min + IVec3::splat(edge - 1));

    let camera_section_center = camera_section.center();
    Self {
      root: TreeNode::Branch(Box::new(Branch::new(bounds, camera_section_center))),
      bounds,
      camera_section_center,
      len: 0,
    }
  }

  /// Block box covered by the tree.
  pub fn bounds(&self) -> &BlockBox {
    &self.bounds
  }

  /// Number of sections in the tree.
  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Insert a section. Returns `true` if it was newly inserted.
  ///
  /// Sections outside the tree's volume are rejected and return `false`.
  pub fn add(&mut self, pos: SectionPos) -> bool {
    if !self.bounds.contains_block(pos.origin()) {
      return false;
    }
    let camera_center = self.camera_section_center;
    let added = match &mut self.root {
      TreeNode::Branch(branch) => branch.add(pos, camera_center),
      TreeNode::Leaf(_) => false,
    };
    if added {
      self.len += 1;
    }
    added
  }

  /// Visit nodes intersecting the frustum, depth first.
  ///
  /// The visitor receives `(node, fully_visible, depth, is_close)`, where
  /// `fully_visible` means no frustum test was needed because an ancestor was
  /// fully inside, and `is_close` means the camera section center lies within
  /// `close_distance` blocks of the node's box (and of all its ancestors').
  #[tracing::instrument(level = "trace", skip_all, name = "octree::visit")]
  pub fn visit<F>(&self, visitor: &mut F, frustum: &Frustum, close_distance: i32)
  where
    F: FnMut(&TreeNode, bool, u32, bool),
  {
    let walk = Walk {
      frustum,
      camera: self.camera_section_center.as_dvec3(),
      close_distance: f64::from(close_distance),
    };
    walk.node(&self.root, visitor, false, 0, true);
  }

  /// Sections visible in the frustum, in traversal order, plus the subset
  /// within `close_distance` of the camera.
  pub fn sections_in_frustum(&self, frustum: &Frustum, close_distance: i32) -> (Vec<SectionPos>, Vec<SectionPos>) {
    let mut visible = Vec::new();
    let mut nearby = Vec::new();
    self.visit(
      &mut |node: &TreeNode, _fully: bool, _depth: u32, is_close: bool| {
        if let Some(pos) = node.section() {
          visible.push(pos);
          if is_close {
            nearby.push(pos);
          }
        }
      },
      frustum,
      close_distance,
    );
    (visible, nearby)
  }
}

struct Walk<'a> {
  frustum: &'a Frustum,
  camera: DVec3,
  close_distance: f64,
}

impl Walk<'_> {
  fn node<F>(&self, node: &TreeNode, visitor: &mut F, skip_frustum: bool, depth: u32, is_close: bool)
  where
    F: FnMut(&TreeNode, bool, u32, bool),
  {
    match node {
      TreeNode::Branch(branch) => {
        let aabb = branch.bounds().to_aabb();
        let fully_visible = skip_frustum
          || match self.frustum.cube_in_frustum(&aabb) {
            Intersection::Outside => return,
            Intersection::Partial => false,
            Intersection::Inside => true,
          };
        let is_close = is_close && aabb.is_within_margin(self.camera, self.close_distance);
        visitor(node, fully_visible, depth, is_close);
        for child in branch.children() {
          self.node(child, visitor, fully_visible, depth + 1, is_close);
        }
      }
      TreeNode::Leaf(pos) => {
        let aabb = Aabb::for_section(*pos);
        if skip_frustum || self.frustum.is_visible(&aabb) {
          let is_close = is_close && aabb.is_within_margin(self.camera, self.close_distance);
          visitor(node, skip_frustum, depth, is_close);
        }
      }
    }
  }
}
