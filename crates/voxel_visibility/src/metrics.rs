//! Graph statistics: rebuild and partial-update timings, visible counts.
//!
//! Feature-gated and runtime-toggled; without the `metrics` feature every
//! `record_*` call is a no-op.
//!
//! ```ignore
//! use voxel_visibility::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics, then toggle at runtime:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let avg = graph.metrics().rebuild_timings.average();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::graph::PropagationStats;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Metrics are compiled in and enabled at runtime.
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Fixed-capacity window of recent samples, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity: capacity.max(1),
    }
  }

  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Oldest to newest.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  pub fn sum(&self) -> u64 {
    self.buffer.iter().sum()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    // ~2 seconds at 60fps
    Self::new(128)
  }
}

/// Statistics collected by [`OcclusionGraph`](crate::graph::OcclusionGraph).
#[derive(Debug, Clone, Default)]
pub struct GraphMetrics {
  /// Full rebuild wall time (schedule to publish), microseconds.
  pub rebuild_timings: RollingWindow<u64>,
  /// Incremental pass time per update, microseconds.
  pub partial_timings: RollingWindow<u64>,
  /// Visible section count per query.
  pub visible_sections: RollingWindow<u64>,
  /// Counters of the last published rebuild.
  pub last_rebuild: PropagationStats,
  /// Sections added by incremental passes since the last rebuild.
  pub incremental_sections: u64,
  pub rebuilds_completed: u64,
  pub rebuilds_failed: u64,
}

impl GraphMetrics {
  pub fn record_rebuild(&mut self, elapsed_us: u64, stats: &PropagationStats) {
    if !is_enabled() {
      return;
    }
    self.rebuild_timings.push(elapsed_us);
    self.last_rebuild = *stats;
    self.incremental_sections = 0;
    self.rebuilds_completed += 1;
  }

  pub fn record_rebuild_failure(&mut self) {
    if is_enabled() {
      self.rebuilds_failed += 1;
    }
  }

  pub fn record_partial(&mut self, elapsed_us: u64, stats: &PropagationStats) {
    if !is_enabled() {
      return;
    }
    self.partial_timings.push(elapsed_us);
    self.incremental_sections += stats.sections_added as u64;
  }

  pub fn record_visible(&mut self, count: u64) {
    if is_enabled() {
      self.visible_sections.push(count);
    }
  }

  pub fn avg_rebuild_timing_us(&self) -> f64 {
    self.rebuild_timings.average()
  }

  pub fn avg_partial_timing_us(&self) -> f64 {
    self.partial_timings.average()
  }
}
