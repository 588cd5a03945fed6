//! Traversal annotation attached to a section during propagation.

use crate::types::{Direction, DirectionSet, SectionPos};

/// A section reached by the flood fill.
///
/// `source_directions` records every direction the section was entered by;
/// `directions` accumulates every direction travelled along the path from the
/// camera and is what the straight-line guard consults.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Node {
  pub section: SectionPos,
  pub source_directions: DirectionSet,
  pub directions: DirectionSet,
  /// Breadth-first step count from the seed.
  pub step: u32,
}

impl Node {
  /// Seed node for the camera's own section: no entry direction.
  pub fn seed(section: SectionPos) -> Self {
    Self {
      section,
      source_directions: DirectionSet::EMPTY,
      directions: DirectionSet::EMPTY,
      step: 0,
    }
  }

  /// Node entered by travelling `direction` from `parent`.
  pub fn entered_from(parent: &Node, section: SectionPos, direction: Direction) -> Self {
    Self {
      section,
      source_directions: DirectionSet::single(direction),
      directions: parent.directions.with(direction),
      step: parent.step + 1,
    }
  }

  #[inline]
  pub fn add_source_direction(&mut self, direction: Direction) {
    self.source_directions.insert(direction);
  }

  #[inline]
  pub fn has_source_directions(&self) -> bool {
    !self.source_directions.is_empty()
  }

  #[inline]
  pub fn has_direction(&self, direction: Direction) -> bool {
    self.directions.contains(direction)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entered_node_extends_path() {
    let root = Node::seed(SectionPos::new(0, 0, 0));
    assert!(!root.has_source_directions());

    let east = Node::entered_from(&root, SectionPos::new(1, 0, 0), Direction::East);
    let up = Node::entered_from(&east, SectionPos::new(1, 1, 0), Direction::Up);

    assert_eq!(up.step, 2);
    assert_eq!(up.source_directions, DirectionSet::single(Direction::Up));
    assert!(up.has_direction(Direction::East));
    assert!(up.has_direction(Direction::Up));
    assert!(!up.has_direction(Direction::West));
  }

  #[test]
  fn test_source_directions_accumulate() {
    let root = Node::seed(SectionPos::new(0, 0, 0));
    let mut node = Node::entered_from(&root, SectionPos::new(0, 0, 1), Direction::South);
    node.add_source_direction(Direction::Down);
    assert_eq!(node.source_directions.len(), 2);
    // The path itself is unchanged.
    assert_eq!(node.directions, DirectionSet::single(Direction::South));
  }
}
