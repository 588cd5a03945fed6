//! Breadth-first flood fill shared by full rebuilds and incremental updates.
//!
//! # Algorithm
//!
//! ```text
//! pop section
//!   known empty?   -> mark_empty, no octree insert
//!   otherwise      -> octree.add, notify if new
//!   for each face:
//!     neighbor outside view window / grid      -> skip
//!     smart culling:
//!       path already went the opposite way    -> skip
//!       no entry face sees this exit face     -> skip
//!       far from camera, ray to camera blocked -> skip
//!     neighbor has node  -> add source direction
//!     neighbor ready     -> new node, enqueue
//!     neighbor waiting   -> new node, defer under its column
//! ```

use std::collections::VecDeque;

use glam::{DVec3, IVec3};

use crate::config::GraphConfig;
use crate::constants::SECTION_SIZE;
use crate::source::{is_in_view_distance, is_section_in_view, SectionSource};
use crate::types::{Axis, CameraSnapshot, Direction, DirectionSet, LevelHeight, SectionPos};

use super::node::Node;
use super::storage::GraphStorage;

/// Counters from one flood-fill pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationStats {
  /// Sections newly inserted into the octree.
  pub sections_added: usize,
  /// Nodes created for newly discovered sections.
  pub nodes_created: usize,
  /// New nodes parked until their neighbors load.
  pub nodes_deferred: usize,
  /// Sections marked empty instead of being inserted.
  pub empty_marked: usize,
}

/// Flood-fill context for one camera position.
pub struct Propagation<'a> {
  source: &'a dyn SectionSource,
  config: &'a GraphConfig,
  camera: &'a CameraSnapshot,
  camera_section: SectionPos,
  view_distance: i32,
  height: LevelHeight,
}

impl<'a> Propagation<'a> {
  pub fn new(source: &'a dyn SectionSource, config: &'a GraphConfig, camera: &'a CameraSnapshot) -> Self {
    Self {
      source,
      config,
      camera,
      camera_section: camera.section(),
      view_distance: source.view_distance(),
      height: source.level_height(),
    }
  }

  /// Seed a full rebuild.
  ///
  /// The camera's own section is the single seed when it is tracked.
  /// Otherwise every section of the nearest world boundary layer inside the
  /// view distance is seeded, entered vertically with horizontal hints
  /// pointing away from the camera, nearest first.
  pub fn seed_full_rebuild(&self, storage: &mut GraphStorage) -> VecDeque<SectionPos> {
    let mut queue = VecDeque::new();

    if self.source.contains(self.camera_section) {
      storage.nodes.insert(self.camera_section, Node::seed(self.camera_section));
      queue.push_back(self.camera_section);
      return queue;
    }

    let camera_block = self.camera.block_pos();
    let above = camera_block.y > self.height.min_block_y();
    let (layer, entered) = if above {
      (self.height.max_section_y, Direction::Down)
    } else {
      (self.height.min_section_y, Direction::Up)
    };

    let center = self.camera_section.column();
    let vd = self.view_distance;
    let mut seeds = Vec::new();
    for dx in -vd..=vd {
      for dz in -vd..=vd {
        let pos = SectionPos::new(center.x() + dx, layer, center.z() + dz);
        if !self.source.contains(pos) || !is_in_view_distance(center, vd, pos.column()) {
          continue;
        }
        let mut directions = DirectionSet::single(entered);
        match dx.signum() {
          1 => directions.insert(Direction::East),
          -1 => directions.insert(Direction::West),
          _ => {}
        }
        match dz.signum() {
          1 => directions.insert(Direction::South),
          -1 => directions.insert(Direction::North),
          _ => {}
        }
        seeds.push(Node {
          section: pos,
          source_directions: DirectionSet::single(entered),
          directions,
          step: 0,
        });
      }
    }

    seeds.sort_by_key(|node| {
      let d = (node.section.center() - camera_block).as_i64vec3();
      d.dot(d)
    });
    for node in seeds {
      storage.nodes.insert(node.section, node);
      queue.push_back(node.section);
    }
    queue
  }

  /// Run the flood fill until `queue` is empty. `on_added` sees every section
  /// newly inserted into the octree.
  #[tracing::instrument(level = "debug", skip_all, name = "graph::flood_fill", fields(seeds = queue.len()))]
  pub fn run<F>(&self, storage: &mut GraphStorage, queue: &mut VecDeque<SectionPos>, mut on_added: F) -> PropagationStats
  where
    F: FnMut(SectionPos),
  {
    let mut stats = PropagationStats::default();

    while let Some(pos) = queue.pop_front() {
      let Some(node) = storage.nodes.get(&pos).copied() else {
        continue;
      };

      if self.source.is_known_empty(pos) {
        self.source.mark_empty(pos);
        stats.empty_marked += 1;
      } else if storage.octree.add(pos) {
        stats.sections_added += 1;
        on_added(pos);
      }

      let far = self.is_far(pos);
      for direction in Direction::ALL {
        let Some(neighbor) = self.neighbor(pos, direction) else {
          continue;
        };

        if self.config.smart_culling {
          if node.has_direction(direction.opposite()) {
            continue;
          }
          if node.has_source_directions() && !self.can_exit(&node, direction) {
            continue;
          }
          if far && !self.has_line_of_sight(storage, neighbor, direction) {
            continue;
          }
        }

        if let Some(existing) = storage.nodes.get_mut(&neighbor) {
          existing.add_source_direction(direction);
          continue;
        }

        let child = Node::entered_from(&node, neighbor, direction);
        stats.nodes_created += 1;
        if self.source.has_all_neighbors(neighbor) {
          storage.nodes.insert(neighbor, child);
          queue.push_back(neighbor);
        } else {
          storage.defer(child);
          stats.nodes_deferred += 1;
        }
      }
    }

    stats
  }

  /// Neighbor of `pos` across `direction`, if it is in view and tracked.
  fn neighbor(&self, pos: SectionPos, direction: Direction) -> Option<SectionPos> {
    let neighbor = pos.relative(direction);
    if !is_section_in_view(self.camera_section, self.view_distance, neighbor) {
      return None;
    }
    self.source.contains(neighbor).then_some(neighbor)
  }

  /// Some entry face of `node` sees the `exit` face.
  fn can_exit(&self, node: &Node, exit: Direction) -> bool {
    node
      .source_directions
      .iter()
      .any(|entered| self.source.faces_can_see_each_other(node.section, entered.opposite(), exit))
  }

  fn is_far(&self, pos: SectionPos) -> bool {
    let delta = (pos.origin() - self.camera_section.origin()).abs();
    f64::from(delta.max_element()) > self.config.advanced_culling_distance
  }

  /// March from the neighbor's camera-facing corner towards the camera and
  /// require every sampled section to already be part of the graph.
  fn has_line_of_sight(&self, storage: &GraphStorage, neighbor: SectionPos, direction: Direction) -> bool {
    let camera_block = self.camera.block_pos();
    let origin = neighbor.origin();
    let corner = |axis: Axis, camera: i32, origin: i32| {
      let toward = if direction.axis() == axis {
        camera > origin
      } else {
        camera < origin
      };
      if toward {
        origin + SECTION_SIZE
      } else {
        origin
      }
    };
    let start = IVec3::new(
      corner(Axis::X, camera_block.x, origin.x),
      corner(Axis::Y, camera_block.y, origin.y),
      corner(Axis::Z, camera_block.z, origin.z),
    )
    .as_dvec3();

    let camera = self.camera.position;
    let step = (camera - start).normalize_or_zero() * self.config.ray_step;
    if step == DVec3::ZERO || self.config.ray_step <= 0.0 {
      return true;
    }

    let threshold_sq = self.config.advanced_culling_distance * self.config.advanced_culling_distance;
    let max_steps = (start.distance(camera) / self.config.ray_step).ceil() as usize + 1;
    let min_y = f64::from(self.height.min_block_y());
    let max_y = f64::from(self.height.max_block_y());

    let mut point = start;
    for _ in 0..max_steps {
      if camera.distance_squared(point) <= threshold_sq {
        break;
      }
      point += step;
      if point.y > max_y || point.y < min_y {
        break;
      }
      let sampled = SectionPos::of_point(point);
      if !self.source.contains(sampled) || !storage.nodes.contains_key(&sampled) {
        return false;
      }
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::test_utils::{camera_at, loaded_grid};
  use crate::types::VisibilitySet;

  #[test]
  fn test_seeds_camera_section_when_tracked() {
    let grid = loaded_grid(2, LevelHeight::new(0, 0), SectionPos::new(0, 0, 0), VisibilitySet::ALL);
    let camera = camera_at(8.0, 8.0, 8.0);
    let config = GraphConfig::NO_OCCLUSION;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);

    let queue = propagation.seed_full_rebuild(&mut storage);
    assert_eq!(Vec::from(queue), vec![SectionPos::new(0, 0, 0)]);
    assert_eq!(storage.nodes[&SectionPos::new(0, 0, 0)], Node::seed(SectionPos::new(0, 0, 0)));
  }

  #[test]
  fn test_seeds_top_layer_from_above() {
    let height = LevelHeight::new(0, 1);
    let grid = loaded_grid(1, height, SectionPos::new(0, 4, 0), VisibilitySet::ALL);
    let camera = camera_at(8.0, 70.0, 8.0);
    let config = GraphConfig::DEFAULT;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);

    let queue = propagation.seed_full_rebuild(&mut storage);
    assert_eq!(queue.len(), 9);
    assert_eq!(queue.front(), Some(&SectionPos::new(0, 1, 0)));
    assert!(queue.iter().all(|pos| pos.y() == 1));

    let corner = storage.nodes[&SectionPos::new(1, 1, -1)];
    assert_eq!(corner.source_directions, DirectionSet::single(Direction::Down));
    assert!(corner.has_direction(Direction::East));
    assert!(corner.has_direction(Direction::North));
    assert_eq!(corner.directions.len(), 3);
  }

  #[test]
  fn test_seeds_bottom_layer_from_below() {
    let height = LevelHeight::new(0, 1);
    let grid = loaded_grid(1, height, SectionPos::new(0, -3, 0), VisibilitySet::ALL);
    let camera = camera_at(8.0, -40.0, 8.0);
    let config = GraphConfig::DEFAULT;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);

    let queue = propagation.seed_full_rebuild(&mut storage);
    assert!(queue.iter().all(|pos| pos.y() == 0));
    assert!(storage
      .nodes
      .values()
      .all(|node| node.source_directions == DirectionSet::single(Direction::Up)));
  }

  #[test]
  fn test_unloaded_neighbors_are_deferred() {
    let grid = loaded_grid(2, LevelHeight::new(0, 0), SectionPos::new(0, 0, 0), VisibilitySet::ALL);
    grid.set_column_loaded(crate::types::ChunkPos::new(1, 0), false);
    let camera = camera_at(8.0, 8.0, 8.0);
    let config = GraphConfig::NO_OCCLUSION;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);

    let mut queue = propagation.seed_full_rebuild(&mut storage);
    let stats = propagation.run(&mut storage, &mut queue, |_| {});

    assert!(stats.nodes_deferred > 0);
    assert!(storage.nodes.contains_key(&SectionPos::new(1, 0, 0)));
    let pending = storage.pending.get(&crate::types::ChunkPos::new(1, 0));
    assert_eq!(pending.map(|sections| sections.as_slice()), Some(&[SectionPos::new(1, 0, 0)][..]));
    assert_eq!(storage.pending_len(), stats.nodes_deferred);
    assert_eq!(storage.octree.len(), stats.sections_added);
  }

  #[test]
  fn test_known_empty_sections_are_marked_not_inserted() {
    let grid = loaded_grid(1, LevelHeight::new(0, 0), SectionPos::new(0, 0, 0), VisibilitySet::ALL);
    let empty = SectionPos::new(1, 0, 0);
    grid.set_all_air(empty, true);
    let camera = camera_at(8.0, 8.0, 8.0);
    let config = GraphConfig::NO_OCCLUSION;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);

    let mut queue = propagation.seed_full_rebuild(&mut storage);
    let mut added = Vec::new();
    let stats = propagation.run(&mut storage, &mut queue, |pos| added.push(pos));

    assert_eq!(stats.empty_marked, 1);
    assert!(!added.contains(&empty));
    assert_eq!(added.len(), 8);
    assert_eq!(grid.mesh_state(empty), Some(crate::grid::MeshState::Compiled(VisibilitySet::ALL)));
  }

  #[test]
  fn test_distant_line_of_sight_needs_sampled_nodes() {
    let grid = loaded_grid(8, LevelHeight::new(0, 0), SectionPos::new(0, 0, 0), VisibilitySet::ALL);
    let camera = camera_at(8.0, 8.0, 8.0);
    let config = GraphConfig::DEFAULT;
    let propagation = Propagation::new(&*grid, &config, &camera);
    let mut storage = GraphStorage::new(&*grid);
    let target = SectionPos::new(6, 0, 0);
    assert!(propagation.is_far(target));

    // The ray from (96, 0, 0) samples sections x = 4 and x = 2.
    let root = Node::seed(SectionPos::new(0, 0, 0));
    for x in [2, 4] {
      let pos = SectionPos::new(x, 0, 0);
      storage.nodes.insert(pos, Node::entered_from(&root, pos, Direction::East));
    }
    assert!(propagation.has_line_of_sight(&storage, target, Direction::East));

    storage.nodes.remove(&SectionPos::new(2, 0, 0));
    assert!(!propagation.has_line_of_sight(&storage, target, Direction::East));
  }

  #[test]
  fn test_near_sections_skip_line_of_sight() {
    let grid: Arc<_> = loaded_grid(4, LevelHeight::new(0, 0), SectionPos::new(0, 0, 0), VisibilitySet::ALL);
    let camera = camera_at(8.0, 8.0, 8.0);
    let config = GraphConfig::DEFAULT;
    let propagation = Propagation::new(&*grid, &config, &camera);
    assert!(!propagation.is_far(SectionPos::new(3, 0, -3)));
    assert!(propagation.is_far(SectionPos::new(4, 0, 0)));
  }
}
