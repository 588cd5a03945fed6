use super::*;

// =========================================================================
// SectionPos / ChunkPos packing
// =========================================================================

#[test]
fn test_section_pos_unpacks_signed_coordinates() {
  let cases = [
    (0, 0, 0),
    (1, -1, 1),
    (-5, 3, 7),
    (2_097_151, 524_287, -2_097_152),
    (-2_097_152, -524_288, 2_097_151),
  ];
  for (x, y, z) in cases {
    let pos = SectionPos::new(x, y, z);
    assert_eq!((pos.x(), pos.y(), pos.z()), (x, y, z), "packing {:?}", (x, y, z));
  }
}

#[test]
fn test_section_pos_of_block_floors() {
  assert_eq!(SectionPos::of_block(IVec3::new(-1, 0, 15)), SectionPos::new(-1, 0, 0));
  assert_eq!(
    SectionPos::of_point(DVec3::new(-0.5, 31.9, 16.0)),
    SectionPos::new(-1, 1, 1)
  );
}

#[test]
fn test_section_pos_geometry() {
  let pos = SectionPos::new(1, -2, 3);
  assert_eq!(pos.origin(), IVec3::new(16, -32, 48));
  assert_eq!(pos.center(), IVec3::new(24, -24, 56));
  assert_eq!(pos.column(), ChunkPos::new(1, 3));
}

#[test]
fn test_relative_moves_one_section() {
  let pos = SectionPos::new(0, 0, 0);
  for direction in Direction::ALL {
    let moved = pos.relative(direction);
    assert_eq!(moved.as_ivec3(), direction.offset());
    assert_eq!(moved.relative(direction.opposite()), pos);
  }
}

#[test]
fn test_chunk_pos_roundtrip_and_distance() {
  let a = ChunkPos::new(-3, 7);
  assert_eq!((a.x(), a.z()), (-3, 7));
  assert_eq!(a.offset(1, -1), ChunkPos::new(-2, 6));
  assert_eq!(a.chessboard_distance(ChunkPos::new(0, 5)), 3);
}

// =========================================================================
// Direction / DirectionSet
// =========================================================================

#[test]
fn test_direction_opposites_are_involutions() {
  for direction in Direction::ALL {
    assert_ne!(direction, direction.opposite());
    assert_eq!(direction.opposite().opposite(), direction);
    assert_eq!(direction.axis(), direction.opposite().axis());
    assert_eq!(Direction::ALL[direction as usize], direction);
  }
}

#[test]
fn test_direction_set_ops() {
  let mut set = DirectionSet::EMPTY;
  assert!(set.is_empty());
  set.insert(Direction::Up);
  let set = set.with(Direction::East);
  assert!(set.contains(Direction::Up));
  assert!(set.contains(Direction::East));
  assert!(!set.contains(Direction::Down));
  assert_eq!(set.len(), 2);
  assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::Up, Direction::East]);

  assert_eq!(set.with(Direction::Down).len(), 3);
  assert!(DirectionSet::single(Direction::Down).contains(Direction::Down));
  assert_eq!(Direction::ALL.into_iter().collect::<DirectionSet>(), DirectionSet::ALL);
}

// =========================================================================
// VisibilitySet
// =========================================================================

#[test]
fn test_visibility_set_is_symmetric() {
  let set = VisibilitySet::NONE.with(Direction::West, Direction::Up, true);
  assert!(set.visibility_between(Direction::West, Direction::Up));
  assert!(set.visibility_between(Direction::Up, Direction::West));
  assert!(!set.visibility_between(Direction::West, Direction::East));
}

#[test]
fn test_visibility_set_clearing_a_pair_keeps_others() {
  let mut set = VisibilitySet::ALL;
  for other in Direction::ALL {
    set.set(Direction::East, other, false);
  }
  for other in Direction::ALL {
    assert!(!set.visibility_between(Direction::East, other));
    assert!(!set.visibility_between(other, Direction::East));
  }
  assert!(set.visibility_between(Direction::West, Direction::North));
}

// =========================================================================
// LevelHeight / CameraSnapshot
// =========================================================================

#[test]
fn test_level_height_bounds() {
  let height = LevelHeight::new(-4, 19);
  assert_eq!(height.section_count(), 24);
  assert_eq!(height.min_block_y(), -64);
  assert_eq!(height.max_block_y(), 320);
  assert!(height.contains_section_y(-4));
  assert!(height.contains_section_y(19));
  assert!(!height.contains_section_y(20));
}

#[test]
fn test_camera_section() {
  let camera = CameraSnapshot::new(DVec3::new(-0.25, 70.0, 33.0));
  assert_eq!(camera.block_pos(), IVec3::new(-1, 70, 33));
  assert_eq!(camera.section(), SectionPos::new(-1, 4, 2));
}
