//! voxel_visibility - section occlusion culling for voxel renderers
//!
//! Decides every frame which 16³ sections of a loaded voxel world are both
//! inside the view frustum and reachable from the camera without being
//! hidden behind solid terrain.
//!
//! # Features
//!
//! - **Occlusion graph**: breadth-first flood fill from the camera's section
//!   that only passes through faces a section's compiled mesh can see
//!   through, with a straight-line guard and a distant line-of-sight test
//! - **Section octree**: camera-ordered bounding-volume tree with
//!   containment inheritance during frustum traversal
//! - **Background rebuilds**: full rebuilds run on rayon and are published
//!   atomically; incremental propagation runs on the render thread
//! - **Ring-buffer grid**: reference [`SectionSource`] that repositions
//!   without copying
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use voxel_visibility::{GraphConfig, OcclusionGraph, SectionGrid, LevelHeight, SectionPos};
//!
//! let grid = Arc::new(SectionGrid::new(12, LevelHeight::new(-4, 19), SectionPos::new(0, 4, 0)));
//! let mut graph = OcclusionGraph::new(grid.clone(), GraphConfig::default());
//! let reader = graph.reader();
//!
//! // Each frame on the render thread:
//! graph.update(&camera, &frustum)?;
//! if reader.consume_frustum_update() {
//!   let sections = graph.collect_visible(&frustum);
//!   // submit sections.visible, re-sort sections.nearby
//! }
//!
//! // From the mesh compiler / chunk loader:
//! reader.on_chunk_ready_to_render(column);
//! reader.schedule_propagation_from(section);
//! ```

pub mod bounds;
pub mod config;
pub mod constants;
pub mod error;
pub mod frustum;
pub mod graph;
pub mod grid;
pub mod metrics;
pub mod octree;
pub mod source;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use bounds::{Aabb, BlockBox};
pub use config::GraphConfig;
pub use error::GraphError;
pub use frustum::{Frustum, Intersection};
pub use graph::{GraphReader, OcclusionGraph, PropagationStats, VisibleSections};
pub use grid::{MeshState, SectionGrid};
pub use octree::{Octree, TreeNode};
pub use source::SectionSource;
pub use types::{CameraSnapshot, ChunkPos, Direction, DirectionSet, LevelHeight, SectionPos, VisibilitySet};
