//! Core value types: section and column keys, face directions, face-pair
//! visibility masks and the camera snapshot.

use glam::{DVec3, IVec3};

use crate::constants::{block_to_section, section_to_block, HALF_SECTION};

// =============================================================================
// SectionPos - packed section key
// =============================================================================

const X_BITS: u32 = 22;
const Z_BITS: u32 = 22;
const Y_BITS: u32 = 20;
const Y_OFFSET: u32 = 0;
const Z_OFFSET: u32 = Y_OFFSET + Y_BITS;
const X_OFFSET: u32 = Z_OFFSET + Z_BITS;
const X_MASK: u64 = (1 << X_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;
const Z_MASK: u64 = (1 << Z_BITS) - 1;

/// Section grid coordinate packed into a single integer.
///
/// Layout (high to low): 22 bits X, 22 bits Z, 20 bits Y, each two's
/// complement. This covers ±2M sections horizontally and ±512K vertically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionPos(u64);

impl SectionPos {
  /// Pack a section coordinate.
  #[inline]
  pub const fn new(x: i32, y: i32, z: i32) -> Self {
    Self(
      ((x as u64 & X_MASK) << X_OFFSET)
        | ((z as u64 & Z_MASK) << Z_OFFSET)
        | ((y as u64 & Y_MASK) << Y_OFFSET),
    )
  }

  /// Section containing a block position.
  #[inline]
  pub const fn of_block(block: IVec3) -> Self {
    Self::new(
      block_to_section(block.x),
      block_to_section(block.y),
      block_to_section(block.z),
    )
  }

  /// Section containing a world-space point.
  #[inline]
  pub fn of_point(point: DVec3) -> Self {
    Self::of_block(point.floor().as_ivec3())
  }

  #[inline]
  pub const fn x(self) -> i32 {
    ((self.0 as i64) << (64 - X_OFFSET - X_BITS) >> (64 - X_BITS)) as i32
  }

  #[inline]
  pub const fn y(self) -> i32 {
    ((self.0 as i64) << (64 - Y_OFFSET - Y_BITS) >> (64 - Y_BITS)) as i32
  }

  #[inline]
  pub const fn z(self) -> i32 {
    ((self.0 as i64) << (64 - Z_OFFSET - Z_BITS) >> (64 - Z_BITS)) as i32
  }

  /// Unpacked coordinate.
  #[inline]
  pub const fn as_ivec3(self) -> IVec3 {
    IVec3::new(self.x(), self.y(), self.z())
  }

  /// Neighbor section across the given face.
  #[inline]
  pub fn relative(self, direction: Direction) -> Self {
    let p = self.as_ivec3() + direction.offset();
    Self::new(p.x, p.y, p.z)
  }

  /// Column this section belongs to.
  #[inline]
  pub const fn column(self) -> ChunkPos {
    ChunkPos::new(self.x(), self.z())
  }

  /// Block coordinate of the minimum corner.
  #[inline]
  pub const fn origin(self) -> IVec3 {
    IVec3::new(
      section_to_block(self.x()),
      section_to_block(self.y()),
      section_to_block(self.z()),
    )
  }

  /// Block coordinate of the center block.
  #[inline]
  pub const fn center(self) -> IVec3 {
    let o = self.origin();
    IVec3::new(o.x + HALF_SECTION, o.y + HALF_SECTION, o.z + HALF_SECTION)
  }
}

impl std::fmt::Debug for SectionPos {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "SectionPos({}, {}, {})", self.x(), self.y(), self.z())
  }
}

impl From<IVec3> for SectionPos {
  fn from(v: IVec3) -> Self {
    Self::new(v.x, v.y, v.z)
  }
}

// =============================================================================
// ChunkPos - packed column key
// =============================================================================

/// Horizontal column of sections, packed as `z << 32 | x`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos(u64);

impl ChunkPos {
  #[inline]
  pub const fn new(x: i32, z: i32) -> Self {
    Self((x as u32 as u64) | ((z as u32 as u64) << 32))
  }

  #[inline]
  pub const fn x(self) -> i32 {
    self.0 as u32 as i32
  }

  #[inline]
  pub const fn z(self) -> i32 {
    (self.0 >> 32) as u32 as i32
  }

  /// Offset by whole columns.
  #[inline]
  pub const fn offset(self, dx: i32, dz: i32) -> Self {
    Self::new(self.x() + dx, self.z() + dz)
  }

  /// Chebyshev distance in columns.
  #[inline]
  pub fn chessboard_distance(self, other: ChunkPos) -> i32 {
    (self.x() - other.x()).abs().max((self.z() - other.z()).abs())
  }
}

impl std::fmt::Debug for ChunkPos {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "ChunkPos({}, {})", self.x(), self.z())
  }
}

// =============================================================================
// Direction / DirectionSet
// =============================================================================

/// One of the six section faces.
///
/// Ordinals are stable and used as bit positions in [`DirectionSet`] and
/// [`VisibilitySet`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Direction {
  Down = 0,
  Up = 1,
  North = 2,
  South = 3,
  West = 4,
  East = 5,
}

/// Axis of a direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
  X,
  Y,
  Z,
}

impl Direction {
  /// All directions in ordinal order.
  pub const ALL: [Direction; 6] = [
    Direction::Down,
    Direction::Up,
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
  ];

  #[inline]
  pub const fn opposite(self) -> Self {
    match self {
      Direction::Down => Direction::Up,
      Direction::Up => Direction::Down,
      Direction::North => Direction::South,
      Direction::South => Direction::North,
      Direction::West => Direction::East,
      Direction::East => Direction::West,
    }
  }

  /// Unit step in section coordinates.
  #[inline]
  pub const fn offset(self) -> IVec3 {
    match self {
      Direction::Down => IVec3::new(0, -1, 0),
      Direction::Up => IVec3::new(0, 1, 0),
      Direction::North => IVec3::new(0, 0, -1),
      Direction::South => IVec3::new(0, 0, 1),
      Direction::West => IVec3::new(-1, 0, 0),
      Direction::East => IVec3::new(1, 0, 0),
    }
  }

  #[inline]
  pub const fn axis(self) -> Axis {
    match self {
      Direction::Down | Direction::Up => Axis::Y,
      Direction::North | Direction::South => Axis::Z,
      Direction::West | Direction::East => Axis::X,
    }
  }
}

/// Bitmask over the six directions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct DirectionSet(u8);

impl DirectionSet {
  pub const EMPTY: Self = Self(0);
  pub const ALL: Self = Self(0b11_1111);

  #[inline]
  pub const fn single(direction: Direction) -> Self {
    Self(1 << direction as u8)
  }

  #[inline]
  pub const fn contains(self, direction: Direction) -> bool {
    self.0 & (1 << direction as u8) != 0
  }

  #[inline]
  pub fn insert(&mut self, direction: Direction) {
    self.0 |= 1 << direction as u8;
  }

  #[inline]
  pub const fn with(self, direction: Direction) -> Self {
    Self(self.0 | (1 << direction as u8))
  }

  #[inline]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  #[inline]
  pub const fn len(self) -> u32 {
    self.0.count_ones()
  }

  /// Directions present, in ordinal order.
  pub fn iter(self) -> impl Iterator<Item = Direction> {
    Direction::ALL.into_iter().filter(move |d| self.contains(*d))
  }
}

impl FromIterator<Direction> for DirectionSet {
  fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
    iter.into_iter().fold(Self::EMPTY, |set, d| set.with(d))
  }
}

// =============================================================================
// VisibilitySet - face-to-face see-through mask
// =============================================================================

/// Which pairs of faces of a compiled section can see each other through its
/// interior. Symmetric: `(a, b)` implies `(b, a)`.
///
/// Stored as a 6×6 bit matrix, bit `a * 6 + b`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct VisibilitySet(u64);

impl VisibilitySet {
  /// Fully opaque: no face sees any other face.
  pub const NONE: Self = Self(0);
  /// Fully transparent: every face sees every face.
  pub const ALL: Self = Self((1 << 36) - 1);

  #[inline]
  const fn bit(a: Direction, b: Direction) -> u64 {
    1 << (a as u64 * 6 + b as u64)
  }

  /// Set visibility between two faces (both orderings).
  pub fn set(&mut self, a: Direction, b: Direction, visible: bool) {
    let mask = Self::bit(a, b) | Self::bit(b, a);
    if visible {
      self.0 |= mask;
    } else {
      self.0 &= !mask;
    }
  }

  /// Builder form of [`set`](Self::set).
  #[must_use]
  pub fn with(mut self, a: Direction, b: Direction, visible: bool) -> Self {
    self.set(a, b, visible);
    self
  }

  #[inline]
  pub const fn visibility_between(self, a: Direction, b: Direction) -> bool {
    self.0 & Self::bit(a, b) != 0
  }
}

// =============================================================================
// LevelHeight / CameraSnapshot
// =============================================================================

/// Vertical extent of the world in sections (both bounds inclusive).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelHeight {
  pub min_section_y: i32,
  pub max_section_y: i32,
}

impl LevelHeight {
  pub fn new(min_section_y: i32, max_section_y: i32) -> Self {
    debug_assert!(min_section_y <= max_section_y, "level height must not be empty");
    Self {
      min_section_y,
      max_section_y,
    }
  }

  /// Number of section layers.
  #[inline]
  pub fn section_count(&self) -> i32 {
    self.max_section_y - self.min_section_y + 1
  }

  /// Lowest block Y.
  #[inline]
  pub fn min_block_y(&self) -> i32 {
    section_to_block(self.min_section_y)
  }

  /// One past the highest block Y.
  #[inline]
  pub fn max_block_y(&self) -> i32 {
    section_to_block(self.max_section_y + 1)
  }

  #[inline]
  pub fn contains_section_y(&self, y: i32) -> bool {
    y >= self.min_section_y && y <= self.max_section_y
  }
}

/// Camera state captured for one frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CameraSnapshot {
  /// World-space eye position.
  pub position: DVec3,
}

impl CameraSnapshot {
  pub fn new(position: DVec3) -> Self {
    Self { position }
  }

  /// Block containing the camera.
  #[inline]
  pub fn block_pos(&self) -> IVec3 {
    self.position.floor().as_ivec3()
  }

  /// Section containing the camera.
  #[inline]
  pub fn section(&self) -> SectionPos {
    SectionPos::of_point(self.position)
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
