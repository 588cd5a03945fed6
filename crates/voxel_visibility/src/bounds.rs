//! Axis-aligned boxes: double-precision world boxes and inclusive block boxes.

use glam::{DVec3, IVec3};

use crate::constants::SECTION_SIZE;
use crate::types::SectionPos;

/// Double-precision axis-aligned bounding box.
///
/// Used for section bounds and frustum tests. The camera may sit far from
/// the origin, so world coordinates stay in f64 until made camera-relative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive).
	pub max: DVec3,
}

impl Aabb {
	/// World box of a section: `[origin, origin + SECTION_SIZE]`.
	pub fn for_section(pos: SectionPos) -> Self {
		let min = pos.origin().as_dvec3();
		Self {
			min,
			max: min + DVec3::splat(SECTION_SIZE as f64),
		}
	}

	/// Grow the box by `amount` on every side.
	#[inline]
	pub fn inflate(&self, amount: f64) -> Self {
		Self {
			min: self.min - DVec3::splat(amount),
			max: self.max + DVec3::splat(amount),
		}
	}

	/// True if `point` lies strictly within `margin` of the box on every axis.
	#[inline]
	pub fn is_within_margin(&self, point: DVec3, margin: f64) -> bool {
		point.x > self.min.x - margin
			&& point.x < self.max.x + margin
			&& point.y > self.min.y - margin
			&& point.y < self.max.y + margin
			&& point.z > self.min.z - margin
			&& point.z < self.max.z + margin
	}
}

/// Integer box over block coordinates, both corners inclusive.
///
/// Octree branches use these so that halving stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockBox {
	pub min: IVec3,
	pub max: IVec3,
}

impl BlockBox {
	pub fn new(min: IVec3, max: IVec3) -> Self {
		debug_assert!(min.cmple(max).all(), "BlockBox min must be <= max on all axes");
		Self { min, max }
	}

	/// Number of blocks along each axis.
	#[inline]
	pub fn span(&self) -> IVec3 {
		self.max - self.min + IVec3::ONE
	}

	/// Center block (rounded towards min).
	#[inline]
	pub fn center(&self) -> IVec3 {
		self.min + self.span() / 2
	}

	#[inline]
	pub fn contains_block(&self, block: IVec3) -> bool {
		block.cmpge(self.min).all() && block.cmple(self.max).all()
	}

	/// Continuous world box covering every block, i.e. `[min, max + 1]`.
	#[inline]
	pub fn to_aabb(&self) -> Aabb {
		Aabb {
			min: self.min.as_dvec3(),
			max: (self.max + IVec3::ONE).as_dvec3(),
		}
	}
}
