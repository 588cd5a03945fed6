//! Octree node variants and per-branch child ordering.

use glam::{BVec3, IVec3};

use crate::bounds::BlockBox;
use crate::constants::SECTION_SIZE;
use crate::types::SectionPos;

/// Branch edge length (blocks) at which children become leaves.
pub const LEAF_PARENT_SPAN: i32 = 2 * SECTION_SIZE;

/// Axis priority used to assign octant bits.
///
/// The axis along which the camera is furthest from the branch center gets
/// the highest bit, so in index order a depth-first walk visits children on
/// the camera's side of that axis first.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AxisSorting {
  Xyz,
  Xzy,
  Yxz,
  Yzx,
  Zxy,
  Zyx,
}

impl AxisSorting {
  /// Pick an ordering from absolute camera-to-center distances per axis.
  pub fn from_distances(abs: IVec3) -> Self {
    if abs.x > abs.y && abs.x > abs.z {
      if abs.y > abs.z {
        AxisSorting::Xyz
      } else {
        AxisSorting::Xzy
      }
    } else if abs.y > abs.x && abs.y > abs.z {
      if abs.x > abs.z {
        AxisSorting::Yxz
      } else {
        AxisSorting::Yzx
      }
    } else if abs.x > abs.y {
      AxisSorting::Zxy
    } else {
      AxisSorting::Zyx
    }
  }

  /// Bit weight of each axis.
  #[inline]
  pub const fn weights(self) -> (usize, usize, usize) {
    match self {
      AxisSorting::Xyz => (4, 2, 1),
      AxisSorting::Xzy => (4, 1, 2),
      AxisSorting::Yxz => (2, 4, 1),
      AxisSorting::Yzx => (1, 4, 2),
      AxisSorting::Zxy => (2, 1, 4),
      AxisSorting::Zyx => (1, 2, 4),
    }
  }

  /// Octant index for a child that is on the far side of the camera along
  /// the flagged axes.
  #[inline]
  pub fn child_index(self, opposite: BVec3) -> usize {
    let (wx, wy, wz) = self.weights();
    usize::from(opposite.x) * wx + usize::from(opposite.y) * wy + usize::from(opposite.z) * wz
  }
}

/// A node of the section octree.
pub enum TreeNode {
  Branch(Box<Branch>),
  Leaf(SectionPos),
}

impl TreeNode {
  /// Section wrapped by a leaf.
  #[inline]
  pub fn section(&self) -> Option<SectionPos> {
    match self {
      TreeNode::Leaf(pos) => Some(*pos),
      TreeNode::Branch(_) => None,
    }
  }
}

/// Inner node: a power-of-two aligned block box with up to 8 children.
pub struct Branch {
  pub(crate) bounds: BlockBox,
  center: IVec3,
  sorting: AxisSorting,
  camera_negative: BVec3,
  pub(crate) children: [Option<TreeNode>; 8],
}

impl Branch {
  pub fn new(bounds: BlockBox, camera_center: IVec3) -> Self {
    let center = bounds.center();
    let diff = camera_center - center;
    Self {
      bounds,
      center,
      sorting: AxisSorting::from_distances(diff.abs()),
      camera_negative: diff.cmplt(IVec3::ZERO),
      children: Default::default(),
    }
  }

  #[inline]
  pub fn bounds(&self) -> &BlockBox {
    &self.bounds
  }

  /// Children in traversal order.
  pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
    self.children.iter().flatten()
  }

  #[inline]
  fn children_are_leaves(&self) -> bool {
    self.bounds.span().x == LEAF_PARENT_SPAN
  }

  /// Insert a section below this branch. Returns true if it was not already
  /// present.
  pub fn add(&mut self, pos: SectionPos, camera_center: IVec3) -> bool {
    let section_negative = (pos.origin() - self.center).cmplt(IVec3::ZERO);
    let opposite = BVec3::new(
      section_negative.x != self.camera_negative.x,
      section_negative.y != self.camera_negative.y,
      section_negative.z != self.camera_negative.z,
    );
    let index = self.sorting.child_index(opposite);

    if self.children_are_leaves() {
      let existed = self.children[index].is_some();
      self.children[index] = Some(TreeNode::Leaf(pos));
      return !existed;
    }

    if self.children[index].is_none() {
      let bounds = self.child_bounds(section_negative);
      self.children[index] = Some(TreeNode::Branch(Box::new(Branch::new(bounds, camera_center))));
    }

    match &mut self.children[index] {
      Some(TreeNode::Branch(branch)) => branch.add(pos, camera_center),
      _ => {
        debug_assert!(false, "leaf found above minimum subdivision");
        false
      }
    }
  }

  fn child_bounds(&self, negative: BVec3) -> BlockBox {
    let pick = |neg: bool, min: i32, center: i32, max: i32| {
      if neg {
        (min, center - 1)
      } else {
        (center, max)
      }
    };
    let (min_x, max_x) = pick(negative.x, self.bounds.min.x, self.center.x, self.bounds.max.x);
    let (min_y, max_y) = pick(negative.y, self.bounds.min.y, self.center.y, self.bounds.max.y);
    let (min_z, max_z) = pick(negative.z, self.bounds.min.z, self.center.z, self.bounds.max.z);
    BlockBox::new(
      IVec3::new(min_x, min_y, min_z),
      IVec3::new(max_x, max_y, max_z),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_axis_sorting_picks_dominant_axis() {
    assert_eq!(AxisSorting::from_distances(IVec3::new(10, 5, 1)), AxisSorting::Xyz);
    assert_eq!(AxisSorting::from_distances(IVec3::new(10, 1, 5)), AxisSorting::Xzy);
    assert_eq!(AxisSorting::from_distances(IVec3::new(5, 10, 1)), AxisSorting::Yxz);
    assert_eq!(AxisSorting::from_distances(IVec3::new(1, 10, 5)), AxisSorting::Yzx);
    assert_eq!(AxisSorting::from_distances(IVec3::new(5, 1, 10)), AxisSorting::Zxy);
    assert_eq!(AxisSorting::from_distances(IVec3::new(1, 5, 10)), AxisSorting::Zyx);
    // Ties fall through to the Z-major orderings.
    assert_eq!(AxisSorting::from_distances(IVec3::ZERO), AxisSorting::Zyx);
  }

  #[test]
  fn test_child_index_is_a_permutation() {
    for sorting in [
      AxisSorting::Xyz,
      AxisSorting::Xzy,
      AxisSorting::Yxz,
      AxisSorting::Yzx,
      AxisSorting::Zxy,
      AxisSorting::Zyx,
    ] {
      let mut seen = [false; 8];
      for bits in 0..8u8 {
        let opposite = BVec3::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0);
        let index = sorting.child_index(opposite);
        assert!(!seen[index], "{:?} maps two octants to {}", sorting, index);
        seen[index] = true;
      }
    }
  }

  #[test]
  fn test_dominant_axis_has_highest_weight() {
    let (wx, wy, wz) = AxisSorting::Yzx.weights();
    assert_eq!(wy, 4);
    assert!(wz > wx);
  }

  #[test]
  fn test_child_bounds_halve_parent() {
    let parent = Branch::new(
      BlockBox::new(IVec3::splat(0), IVec3::splat(63)),
      IVec3::splat(8),
    );
    let low = parent.child_bounds(BVec3::TRUE);
    let high = parent.child_bounds(BVec3::FALSE);
    assert_eq!(low, BlockBox::new(IVec3::ZERO, IVec3::splat(31)));
    assert_eq!(high, BlockBox::new(IVec3::splat(32), IVec3::splat(63)));
  }
}
