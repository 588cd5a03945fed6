//! Event queues feeding incremental propagation.
//!
//! Producers may run on any thread; the render thread is the single
//! consumer per snapshot generation.

use std::collections::HashSet;

use crossbeam_channel::{self as channel, Receiver, Sender};
use parking_lot::Mutex;

use crate::types::{ChunkPos, SectionPos};

/// Pending incremental work for one snapshot.
pub struct GraphEvents {
  chunks_with_new_neighbors: Mutex<HashSet<ChunkPos>>,
  propagate_tx: Sender<SectionPos>,
  propagate_rx: Receiver<SectionPos>,
}

impl GraphEvents {
  pub fn new() -> Self {
    let (propagate_tx, propagate_rx) = channel::unbounded();
    Self {
      chunks_with_new_neighbors: Mutex::new(HashSet::new()),
      propagate_tx,
      propagate_rx,
    }
  }

  /// A column became ready: it and its four horizontal neighbors may now
  /// have all neighbors loaded.
  pub fn column_ready(&self, column: ChunkPos) {
    let mut chunks = self.chunks_with_new_neighbors.lock();
    chunks.insert(column);
    chunks.insert(column.offset(-1, 0));
    chunks.insert(column.offset(1, 0));
    chunks.insert(column.offset(0, -1));
    chunks.insert(column.offset(0, 1));
  }

  /// Queue a section to propagate from on the next update.
  pub fn schedule(&self, section: SectionPos) {
    // Both ends live in `self`, so the channel cannot be disconnected.
    let _ = self.propagate_tx.send(section);
  }

  /// Take the columns that gained neighbors since the last call.
  pub fn take_columns(&self) -> Vec<ChunkPos> {
    self.chunks_with_new_neighbors.lock().drain().collect()
  }

  /// Drain every section queued so far.
  pub fn drain_sections(&self) -> impl Iterator<Item = SectionPos> + '_ {
    self.propagate_rx.try_iter()
  }

  /// True if no column or section events are pending.
  pub fn is_empty(&self) -> bool {
    self.propagate_rx.is_empty() && self.chunks_with_new_neighbors.lock().is_empty()
  }
}

impl Default for GraphEvents {
  fn default() -> Self {
    Self::new()
  }
}
