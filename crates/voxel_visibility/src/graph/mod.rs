//! Occlusion graph: which sections are reachable from the camera without
//! being blocked by solid geometry.
//!
//! # Threads
//!
//! ```text
//! Render thread                         Async (rayon)
//! ┌──────────────────────┐
//! │ update()             │
//! │  poll rebuild        │◄───────────────────────┐
//! │  swap snapshot       │                        │
//! │  schedule rebuild ───┼──► seed + flood fill ──┘
//! │  partial pass        │    (private snapshot)
//! └──────────────────────┘
//!
//! Any thread (GraphReader)
//!   collect_visible()          reads the current snapshot
//!   on_chunk_ready_to_render() events for current + in-flight snapshot
//!   schedule_propagation_from()
//! ```
//!
//! The current snapshot is an `Arc<GraphState>` behind a lock; publishing a
//! rebuild is one pointer store. A reader clones the `Arc` and queries that
//! generation only, so it never mixes two generations.
//!
//! # Module Structure
//!
//! - [`node`]: per-section traversal annotation
//! - [`storage`]: octree, node map and pending-neighbor index of a snapshot
//! - [`events`]: incremental event queues
//! - [`propagation`]: the flood fill

pub mod events;
pub mod node;
pub mod propagation;
pub mod storage;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::bounds::Aabb;
use crate::config::GraphConfig;
use crate::constants::SECTION_SIZE;
use crate::error::{panic_message, GraphError};
use crate::frustum::Frustum;
use crate::metrics::GraphMetrics;
use crate::source::SectionSource;
use crate::types::{CameraSnapshot, ChunkPos, SectionPos};

pub use events::GraphEvents;
pub use node::Node;
pub use propagation::{Propagation, PropagationStats};
pub use storage::GraphStorage;

// =============================================================================
// Snapshot
// =============================================================================

/// One generation of the graph.
pub struct GraphState {
  storage: Mutex<GraphStorage>,
  events: Arc<GraphEvents>,
}

impl GraphState {
  fn new(source: &dyn SectionSource) -> Self {
    Self {
      storage: Mutex::new(GraphStorage::new(source)),
      events: Arc::new(GraphEvents::new()),
    }
  }

  /// Number of sections in this generation's octree.
  pub fn section_count(&self) -> usize {
    self.storage.lock().octree.len()
  }
}

struct SharedState {
  current: RwLock<Arc<GraphState>>,
  /// Events of the in-flight rebuild, if any.
  next_events: Mutex<Option<Arc<GraphEvents>>>,
  needs_frustum_update: AtomicBool,
}

impl SharedState {
  fn current(&self) -> Arc<GraphState> {
    self.current.read().clone()
  }

  /// Install `state` as current and retire the in-flight event queue.
  fn publish(&self, state: Arc<GraphState>) {
    let mut next = self.next_events.lock();
    *self.current.write() = state;
    *next = None;
    self.needs_frustum_update.store(true, Ordering::Release);
  }

  /// Deliver an event to the in-flight snapshot and to the current one.
  fn deliver(&self, event: impl Fn(&GraphEvents)) {
    // Holding `next_events` orders this against `publish`.
    let next = self.next_events.lock();
    let current = self.current();
    if let Some(next) = next.as_ref() {
      event(next);
      if Arc::ptr_eq(next, &current.events) {
        return;
      }
    }
    event(&current.events);
  }
}

// =============================================================================
// GraphReader
// =============================================================================

/// Sections returned by a frustum query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleSections {
  /// Visible sections, roughly near to far.
  pub visible: Vec<SectionPos>,
  /// Subset within the close distance of the camera.
  pub nearby: Vec<SectionPos>,
}

/// Cloneable handle for querying the current snapshot and posting events.
#[derive(Clone)]
pub struct GraphReader {
  shared: Arc<SharedState>,
}

impl GraphReader {
  /// Sections of the current snapshot inside `frustum`.
  pub fn collect_visible(&self, frustum: &Frustum, close_distance: i32) -> VisibleSections {
    let state = self.shared.current();
    let storage = state.storage.lock();
    let (visible, nearby) = storage.octree.sections_in_frustum(frustum, close_distance);
    VisibleSections { visible, nearby }
  }

  /// Number of sections in the current snapshot.
  pub fn section_count(&self) -> usize {
    self.shared.current().section_count()
  }

  /// True once after the graph changed in a way that may affect the visible
  /// set.
  pub fn consume_frustum_update(&self) -> bool {
    self
      .shared
      .needs_frustum_update
      .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  /// A column finished loading: sections waiting on it or its neighbors may
  /// proceed on the next update.
  pub fn on_chunk_ready_to_render(&self, column: ChunkPos) {
    self.shared.deliver(|events| events.column_ready(column));
  }

  /// Re-run propagation from `section` on the next update, e.g. after its
  /// mesh was recompiled.
  pub fn schedule_propagation_from(&self, section: SectionPos) {
    self.shared.deliver(|events| events.schedule(section));
  }
}

// =============================================================================
// OcclusionGraph
// =============================================================================

struct PendingRebuild {
  receiver: Receiver<Result<(Arc<GraphState>, PropagationStats), GraphError>>,
  started: Instant,
}

/// Owner of the graph, driven once per frame from the render thread.
pub struct OcclusionGraph {
  shared: Arc<SharedState>,
  source: Arc<dyn SectionSource>,
  config: GraphConfig,
  needs_full_update: bool,
  rebuild: Option<PendingRebuild>,
  owner: ThreadId,
  metrics: GraphMetrics,
}

impl OcclusionGraph {
  /// Create an empty graph owned by the calling thread. The first
  /// [`update`](Self::update) schedules a full rebuild.
  pub fn new(source: Arc<dyn SectionSource>, config: GraphConfig) -> Self {
    let state = Arc::new(GraphState::new(&*source));
    Self {
      shared: Arc::new(SharedState {
        current: RwLock::new(state),
        next_events: Mutex::new(None),
        needs_frustum_update: AtomicBool::new(false),
      }),
      source,
      config,
      needs_full_update: true,
      rebuild: None,
      owner: thread::current().id(),
      metrics: GraphMetrics::default(),
    }
  }

  pub fn reader(&self) -> GraphReader {
    GraphReader {
      shared: Arc::clone(&self.shared),
    }
  }

  pub fn config(&self) -> &GraphConfig {
    &self.config
  }

  /// Replace the configuration. Applies to the next partial pass and
  /// rebuild; call [`invalidate`](Self::invalidate) to rebuild with it.
  pub fn set_config(&mut self, config: GraphConfig) {
    self.config = config;
  }

  pub fn metrics(&self) -> &GraphMetrics {
    &self.metrics
  }

  /// Request a full rebuild. Coalesced with any pending request.
  pub fn invalidate(&mut self) {
    self.needs_full_update = true;
  }

  pub fn needs_full_update(&self) -> bool {
    self.needs_full_update
  }

  pub fn is_rebuilding(&self) -> bool {
    self.rebuild.is_some()
  }

  /// Per-frame driver.
  ///
  /// Publishes a finished rebuild, schedules a new one if requested and
  /// none is in flight, then runs incremental propagation on the current
  /// snapshot. Returns the error of a rebuild that failed since the last
  /// call; the previous snapshot stays current in that case.
  pub fn update(&mut self, camera: &CameraSnapshot, frustum: &Frustum) -> Result<(), GraphError> {
    self.assert_owner();

    let polled = self.poll_rebuild();
    if self.needs_full_update && self.rebuild.is_none() {
      self.schedule_full_update(*camera);
    }

    let start = Instant::now();
    let stats = self.run_partial_update(camera, frustum);
    self.metrics.record_partial(start.elapsed().as_micros() as u64, &stats);

    polled
  }

  /// Sections of the current snapshot inside `frustum`, using the
  /// configured close distance.
  pub fn collect_visible(&mut self, frustum: &Frustum) -> VisibleSections {
    let sections = self.reader().collect_visible(frustum, self.config.close_distance);
    self.metrics.record_visible(sections.visible.len() as u64);
    sections
  }

  /// Block until the in-flight rebuild finishes and publish it.
  ///
  /// Returns `Ok(false)` if no rebuild was in flight.
  pub fn complete_pending_rebuild(&mut self) -> Result<bool, GraphError> {
    self.assert_owner();
    let Some(rebuild) = self.rebuild.take() else {
      return Ok(false);
    };
    let result = rebuild.receiver.recv().unwrap_or(Err(GraphError::RebuildDisconnected));
    self.finish_rebuild(rebuild.started, result).map(|()| true)
  }

  /// Join any in-flight rebuild, then discard all graph state.
  ///
  /// Used when the section source is replaced (world unload, view distance
  /// change). The next update rebuilds from scratch.
  pub fn wait_and_reset(&mut self, source: Option<Arc<dyn SectionSource>>) {
    self.assert_owner();
    if let Some(rebuild) = self.rebuild.take() {
      // The outcome is irrelevant: the state is discarded either way.
      let _ = rebuild.receiver.recv();
    }
    if let Some(source) = source {
      self.source = source;
    }
    self.shared.publish(Arc::new(GraphState::new(&*self.source)));
    self.invalidate();
    debug!("occlusion graph reset");
  }

  fn assert_owner(&self) {
    assert_eq!(
      thread::current().id(),
      self.owner,
      "occlusion graph driven from a thread other than its owner"
    );
  }

  fn poll_rebuild(&mut self) -> Result<(), GraphError> {
    let Some(rebuild) = self.rebuild.as_ref() else {
      return Ok(());
    };
    let result = match rebuild.receiver.try_recv() {
      Ok(result) => result,
      Err(TryRecvError::Empty) => return Ok(()),
      Err(TryRecvError::Disconnected) => Err(GraphError::RebuildDisconnected),
    };
    let started = rebuild.started;
    self.rebuild = None;
    self.finish_rebuild(started, result)
  }

  fn finish_rebuild(
    &mut self,
    started: Instant,
    result: Result<(Arc<GraphState>, PropagationStats), GraphError>,
  ) -> Result<(), GraphError> {
    let elapsed_us = started.elapsed().as_micros() as u64;
    match result {
      Ok((state, stats)) => {
        self.shared.publish(state);
        self.metrics.record_rebuild(elapsed_us, &stats);
        debug!(
          sections = stats.sections_added,
          deferred = stats.nodes_deferred,
          elapsed_us,
          "published graph rebuild"
        );
        Ok(())
      }
      Err(error) => {
        *self.shared.next_events.lock() = None;
        self.metrics.record_rebuild_failure();
        warn!(%error, "graph rebuild failed, keeping previous snapshot");
        Err(error)
      }
    }
  }

  fn schedule_full_update(&mut self, camera: CameraSnapshot) {
    self.needs_full_update = false;

    let state = Arc::new(GraphState::new(&*self.source));
    *self.shared.next_events.lock() = Some(Arc::clone(&state.events));

    let (sender, receiver) = channel::bounded(1);
    let source = Arc::clone(&self.source);
    let config = self.config;
    debug!(camera_section = ?camera.section(), "scheduling graph rebuild");

    rayon::spawn(move || {
      let result = panic::catch_unwind(AssertUnwindSafe(|| rebuild(&state, &*source, &config, &camera)))
        .map(|stats| (state, stats))
        .map_err(|payload| GraphError::RebuildPanicked(panic_message(&*payload)));
      // Receiver dropped = graph reset or dropped.
      let _ = sender.send(result);
    });

    self.rebuild = Some(PendingRebuild {
      receiver,
      started: Instant::now(),
    });
  }

  fn run_partial_update(&self, camera: &CameraSnapshot, frustum: &Frustum) -> PropagationStats {
    let state = self.shared.current();
    let mut storage = state.storage.lock();
    let mut seeds = Vec::new();

    for column in state.events.take_columns() {
      if let Some(released) = storage.release_column(column, &*self.source) {
        trace!(?column, count = released.len(), "released sections waiting on neighbors");
        seeds.extend(released);
      }
    }
    seeds.extend(state.events.drain_sections());
    if seeds.is_empty() {
      return PropagationStats::default();
    }

    let camera_section = camera.section();
    let mut queue = VecDeque::with_capacity(seeds.len());
    for section in seeds {
      if storage.nodes.contains_key(&section) {
        queue.push_back(section);
      } else if section == camera_section && self.source.contains(section) {
        storage.nodes.insert(section, Node::seed(section));
        queue.push_back(section);
      }
    }

    let offset_frustum = frustum.clone().offset_to_fully_include_camera_cube(self.config.camera_cube_offset);
    let needs_frustum_update = &self.shared.needs_frustum_update;
    let propagation = Propagation::new(&*self.source, &self.config, camera);
    propagation.run(&mut storage, &mut queue, |pos| {
      let bounds = Aabb::for_section(pos).inflate(f64::from(SECTION_SIZE));
      if offset_frustum.is_visible(&bounds) {
        needs_frustum_update.store(true, Ordering::Release);
      }
    })
  }
}

/// Build a snapshot from scratch. Runs on the rebuild worker.
fn rebuild(
  state: &GraphState,
  source: &dyn SectionSource,
  config: &GraphConfig,
  camera: &CameraSnapshot,
) -> PropagationStats {
  let _span = tracing::debug_span!("graph::rebuild").entered();
  let mut storage = state.storage.lock();
  let propagation = Propagation::new(source, config, camera);
  let mut queue = propagation.seed_full_rebuild(&mut storage);
  propagation.run(&mut storage, &mut queue, |_| {})
}
