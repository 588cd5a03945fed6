//! SectionGrid - ring-buffer section storage around the camera.
//!
//! Storage is a fixed `(2r + 1) × height × (2r + 1)` array. A section at
//! `(x, y, z)` always lives in slot `(x mod size, y - min_y, z mod size)`,
//! so moving the window only reassigns the slots whose logical coordinate
//! changed; nothing is copied.
//!
//! ```text
//! center.x = 5, r = 1, size = 3
//!
//!   logical x:   4   5   6          after reposition(center.x = 6):
//!   slot:        1   2   0            logical x: 5   6   7
//!                                     slot:      2   0   1   (slot 1 reset)
//! ```

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::source::SectionSource;
use crate::types::{ChunkPos, Direction, LevelHeight, SectionPos, VisibilitySet};

/// Compilation state of a section's mesh.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MeshState {
  /// Not compiled yet: faces cannot see each other.
  Uncompiled,
  /// No geometry: every face sees every other face.
  Empty,
  /// Compiled, with the face-pair visibility computed by the mesher.
  Compiled(VisibilitySet),
}

#[derive(Clone, Copy, Debug)]
struct Slot {
  pos: SectionPos,
  mesh: MeshState,
  /// World data reports no blocks in this section.
  all_air: bool,
}

impl Slot {
  fn fresh(pos: SectionPos) -> Self {
    Self {
      pos,
      mesh: MeshState::Uncompiled,
      all_air: false,
    }
  }
}

struct GridState {
  center: SectionPos,
  slots: Vec<Slot>,
  loaded_columns: HashSet<ChunkPos>,
}

/// Ring-buffer implementation of [`SectionSource`].
pub struct SectionGrid {
  view_distance: i32,
  height: LevelHeight,
  size: i32,
  state: RwLock<GridState>,
}

impl SectionGrid {
  /// Create a grid of radius `view_distance` columns around `center`.
  pub fn new(view_distance: i32, height: LevelHeight, center: SectionPos) -> Self {
    let view_distance = view_distance.max(0);
    let size = view_distance * 2 + 1;
    let slot_count = (size * size * height.section_count()) as usize;
    let placeholder = Slot::fresh(center);
    let grid = Self {
      view_distance,
      height,
      size,
      state: RwLock::new(GridState {
        center,
        slots: vec![placeholder; slot_count],
        loaded_columns: HashSet::new(),
      }),
    };
    grid.assign_slots(&mut grid.state.write(), center, true);
    grid
  }

  /// Number of slots.
  pub fn capacity(&self) -> usize {
    self.state.read().slots.len()
  }

  /// Move the window. Slots whose logical coordinate changes are reset to
  /// uncompiled; loaded columns beyond the neighbor ring are forgotten.
  pub fn reposition(&self, new_center: SectionPos) {
    let mut state = self.state.write();
    self.assign_slots(&mut state, new_center, false);
    let center_column = new_center.column();
    let keep = self.view_distance + 1;
    state
      .loaded_columns
      .retain(|column| column.chessboard_distance(center_column) <= keep);
  }

  /// Mark a column's data as loaded or unloaded.
  pub fn set_column_loaded(&self, column: ChunkPos, loaded: bool) {
    let mut state = self.state.write();
    if loaded {
      state.loaded_columns.insert(column);
    } else {
      state.loaded_columns.remove(&column);
    }
  }

  /// Load every column of the window and its neighbor ring.
  pub fn load_all_columns(&self) {
    let mut state = self.state.write();
    let center = state.center.column();
    let r = self.view_distance + 1;
    for dx in -r..=r {
      for dz in -r..=r {
        state.loaded_columns.insert(center.offset(dx, dz));
      }
    }
  }

  /// True if the column's data is loaded.
  pub fn is_column_loaded(&self, column: ChunkPos) -> bool {
    self.state.read().loaded_columns.contains(&column)
  }

  /// Current mesh state, `None` outside the window.
  pub fn mesh_state(&self, pos: SectionPos) -> Option<MeshState> {
    let state = self.state.read();
    self.slot(&state, pos).map(|slot| slot.mesh)
  }

  /// Store a compiled mesh's face visibility. Returns false outside the window.
  pub fn set_compiled(&self, pos: SectionPos, visibility: VisibilitySet) -> bool {
    self.set_mesh_state(pos, MeshState::Compiled(visibility))
  }

  /// Overwrite a section's mesh state. Returns false outside the window.
  pub fn set_mesh_state(&self, pos: SectionPos, mesh: MeshState) -> bool {
    let mut state = self.state.write();
    match self.slot_index(&state, pos) {
      Some(index) => {
        state.slots[index].mesh = mesh;
        true
      }
      None => false,
    }
  }

  /// Record whether world data has any blocks in the section. Returns false
  /// outside the window.
  pub fn set_all_air(&self, pos: SectionPos, all_air: bool) -> bool {
    let mut state = self.state.write();
    match self.slot_index(&state, pos) {
      Some(index) => {
        state.slots[index].all_air = all_air;
        true
      }
      None => false,
    }
  }

  /// Set every slot to the same compiled visibility.
  pub fn compile_all(&self, visibility: VisibilitySet) {
    let mut state = self.state.write();
    for slot in &mut state.slots {
      slot.mesh = MeshState::Compiled(visibility);
    }
  }

  /// Sections currently tracked, in slot order.
  pub fn sections(&self) -> Vec<SectionPos> {
    self.state.read().slots.iter().map(|slot| slot.pos).collect()
  }

  fn assign_slots(&self, state: &mut GridState, center: SectionPos, force: bool) {
    state.center = center;
    let r = self.view_distance;
    for x in center.x() - r..=center.x() + r {
      for z in center.z() - r..=center.z() + r {
        for y in self.height.min_section_y..=self.height.max_section_y {
          let pos = SectionPos::new(x, y, z);
          let index = self.raw_index(pos);
          let slot = &mut state.slots[index];
          if force || slot.pos != pos {
            *slot = Slot::fresh(pos);
          }
        }
      }
    }
  }

  #[inline]
  fn raw_index(&self, pos: SectionPos) -> usize {
    let x = pos.x().rem_euclid(self.size);
    let z = pos.z().rem_euclid(self.size);
    let y = pos.y() - self.height.min_section_y;
    ((x * self.height.section_count() + y) * self.size + z) as usize
  }

  fn slot_index(&self, state: &GridState, pos: SectionPos) -> Option<usize> {
    if !self.height.contains_section_y(pos.y()) {
      return None;
    }
    if pos.column().chessboard_distance(state.center.column()) > self.view_distance {
      return None;
    }
    let index = self.raw_index(pos);
    (state.slots[index].pos == pos).then_some(index)
  }

  fn slot<'a>(&self, state: &'a GridState, pos: SectionPos) -> Option<&'a Slot> {
    self.slot_index(state, pos).map(|index| &state.slots[index])
  }
}

impl SectionSource for SectionGrid {
  fn view_distance(&self) -> i32 {
    self.view_distance
  }

  fn level_height(&self) -> LevelHeight {
    self.height
  }

  fn center(&self) -> SectionPos {
    self.state.read().center
  }

  fn contains(&self, pos: SectionPos) -> bool {
    let state = self.state.read();
    self.slot_index(&state, pos).is_some()
  }

  fn has_all_neighbors(&self, pos: SectionPos) -> bool {
    let state = self.state.read();
    if self.slot_index(&state, pos).is_none() {
      return false;
    }
    let column = pos.column();
    [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)]
      .into_iter()
      .all(|(dx, dz)| state.loaded_columns.contains(&column.offset(dx, dz)))
  }

  fn faces_can_see_each_other(&self, pos: SectionPos, from: Direction, to: Direction) -> bool {
    let state = self.state.read();
    match self.slot(&state, pos).map(|slot| slot.mesh) {
      Some(MeshState::Compiled(visibility)) => visibility.visibility_between(from, to),
      Some(MeshState::Empty) => true,
      Some(MeshState::Uncompiled) | None => false,
    }
  }

  fn is_known_empty(&self, pos: SectionPos) -> bool {
    let state = self.state.read();
    self.slot(&state, pos).is_some_and(|slot| slot.all_air)
  }

  fn mark_empty(&self, pos: SectionPos) {
    let mut state = self.state.write();
    if let Some(index) = self.slot_index(&state, pos) {
      let slot = &mut state.slots[index];
      if slot.mesh == MeshState::Uncompiled {
        slot.mesh = MeshState::Empty;
      }
    }
  }
}

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;
