//! Grid and distance constants for section visibility.
//!
//! A section is a cube of `SECTION_SIZE³` blocks. All world-space distances
//! below are in blocks (world units), not sections.
//!
//! ```text
//! Section coordinate -> world space:
//!
//!   origin = section * SECTION_SIZE
//!   center = origin + SECTION_SIZE / 2
//!   box    = [origin, origin + SECTION_SIZE]
//! ```

/// Edge length of a section in blocks.
pub const SECTION_SIZE: i32 = 16;

/// log2(SECTION_SIZE), for block <-> section conversion via shifts.
pub const SECTION_BITS: i32 = 4;

/// Half a section, used for section centers.
pub const HALF_SECTION: i32 = SECTION_SIZE / 2;

/// Distance (blocks, per axis) beyond which the distant line-of-sight test
/// runs during smart-culled propagation.
pub const ADVANCED_CULLING_DISTANCE: f64 = 60.0;

/// Ray-march step for the distant line-of-sight test: the section diagonal,
/// rounded up. `ceil(sqrt(3) * 16) = 28`.
pub const CEILED_SECTION_DIAGONAL: f64 = 28.0;

/// Default margin (blocks) for the "nearby" subset of visible sections.
pub const DEFAULT_CLOSE_DISTANCE: i32 = 32;

/// Default camera-cube margin for the conservative frustum used while
/// propagating incrementally.
pub const DEFAULT_CAMERA_CUBE_OFFSET: i32 = 8;

/// Step (blocks) by which the virtual camera is pulled back when fitting
/// the camera cube inside the frustum.
pub const FRUSTUM_OFFSET_STEP: f32 = 4.0;

/// Upper bound on camera pull-back iterations. Degenerate projections may
/// never fully contain the camera cube.
pub const MAX_FRUSTUM_OFFSET_STEPS: usize = 256;

/// Convert a block coordinate to its section coordinate.
#[inline]
pub const fn block_to_section(block: i32) -> i32 {
  block >> SECTION_BITS
}

/// Convert a section coordinate to the block coordinate of its origin.
#[inline]
pub const fn section_to_block(section: i32) -> i32 {
  section << SECTION_BITS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_section_size_matches_bits() {
    assert_eq!(1 << SECTION_BITS, SECTION_SIZE);
  }

  #[test]
  fn test_block_to_section_floors_negatives() {
    assert_eq!(block_to_section(0), 0);
    assert_eq!(block_to_section(15), 0);
    assert_eq!(block_to_section(16), 1);
    assert_eq!(block_to_section(-1), -1);
    assert_eq!(block_to_section(-16), -1);
    assert_eq!(block_to_section(-17), -2);
  }

  #[test]
  fn test_section_diagonal_is_ceiled() {
    let diagonal = (3.0_f64).sqrt() * SECTION_SIZE as f64;
    assert_eq!(CEILED_SECTION_DIAGONAL, diagonal.ceil());
  }
}
