//! Per-snapshot graph storage.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::octree::Octree;
use crate::source::SectionSource;
use crate::types::{ChunkPos, SectionPos};

use super::node::Node;

/// Sections of one column waiting on neighbors.
pub type PendingSections = SmallVec<[SectionPos; 8]>;

/// Octree, node map and pending-neighbor index of one snapshot.
///
/// Invariant: a section is listed under `pending` only while it has a node
/// and its neighbors are not all loaded.
pub struct GraphStorage {
  pub octree: Octree,
  pub nodes: HashMap<SectionPos, Node>,
  pub pending: HashMap<ChunkPos, PendingSections>,
}

impl GraphStorage {
  /// Empty storage sized for the source's current window.
  pub fn new(source: &dyn SectionSource) -> Self {
    Self {
      octree: Octree::new(source.center(), source.view_distance(), source.level_height()),
      nodes: HashMap::new(),
      pending: HashMap::new(),
    }
  }

  /// Record a node that must wait for its column's neighbors.
  pub fn defer(&mut self, node: Node) {
    self.pending.entry(node.section.column()).or_default().push(node.section);
    self.nodes.insert(node.section, node);
  }

  /// Release the pending sections of `column` if its first pending section
  /// now has all neighbors. Returns the released sections.
  pub fn release_column(&mut self, column: ChunkPos, source: &dyn SectionSource) -> Option<PendingSections> {
    let ready = self
      .pending
      .get(&column)
      .and_then(|sections| sections.first())
      .is_some_and(|first| source.has_all_neighbors(*first));
    if ready {
      self.pending.remove(&column)
    } else {
      None
    }
  }

  /// Number of sections waiting on neighbors.
  pub fn pending_len(&self) -> usize {
    self.pending.values().map(SmallVec::len).sum()
  }
}
