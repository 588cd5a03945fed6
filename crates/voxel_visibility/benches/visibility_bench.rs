//! Benchmarks for section visibility: octree build and frustum query, full
//! flood-fill rebuild, and grid repositioning.
//!
//! Workload: a 24-layer world around a camera at the origin, view distances
//! typical for a voxel client.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::{DVec3, Mat4, Vec3};
use voxel_visibility::graph::{GraphStorage, Propagation};
use voxel_visibility::{CameraSnapshot, Frustum, GraphConfig, LevelHeight, Octree, SectionGrid, SectionPos, VisibilitySet};

const HEIGHT: LevelHeight = LevelHeight {
	min_section_y: -4,
	max_section_y: 19,
};

fn camera() -> CameraSnapshot {
	CameraSnapshot::new(DVec3::new(8.0, 72.0, 8.0))
}

fn perspective(camera: &CameraSnapshot) -> Frustum {
	let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::new(1.0, -0.3, 0.4).normalize(), Vec3::Y);
	let projection = Mat4::perspective_rh_gl(70f32.to_radians(), 16.0 / 9.0, 0.05, 1024.0);
	Frustum::new(view, projection).at(camera.position)
}

fn filled_octree(view_distance: i32) -> Octree {
	let center = camera().section();
	let mut octree = Octree::new(center, view_distance, HEIGHT);
	for x in -view_distance..=view_distance {
		for z in -view_distance..=view_distance {
			for y in HEIGHT.min_section_y..=HEIGHT.max_section_y {
				octree.add(SectionPos::new(center.x() + x, y, center.z() + z));
			}
		}
	}
	octree
}

fn loaded_grid(view_distance: i32) -> SectionGrid {
	let grid = SectionGrid::new(view_distance, HEIGHT, camera().section());
	grid.load_all_columns();
	grid.compile_all(VisibilitySet::ALL);
	grid
}

// ============================================================================
// Octree
// ============================================================================

fn bench_octree_build(c: &mut Criterion) {
	let mut group = c.benchmark_group("octree_build");
	for view_distance in [8, 16] {
		let sections = ((view_distance * 2 + 1).pow(2) * HEIGHT.section_count()) as u64;
		group.throughput(Throughput::Elements(sections));
		group.bench_with_input(BenchmarkId::from_parameter(view_distance), &view_distance, |b, &vd| {
			b.iter(|| black_box(filled_octree(vd).len()))
		});
	}
	group.finish();
}

fn bench_octree_query(c: &mut Criterion) {
	let mut group = c.benchmark_group("octree_frustum_query");
	let camera = camera();
	let frustum = perspective(&camera);
	for view_distance in [8, 16] {
		let octree = filled_octree(view_distance);
		group.bench_with_input(BenchmarkId::from_parameter(view_distance), &octree, |b, octree| {
			b.iter(|| black_box(octree.sections_in_frustum(&frustum, 32).0.len()))
		});
	}
	group.finish();
}

// ============================================================================
// Flood fill
// ============================================================================

fn bench_full_rebuild(c: &mut Criterion) {
	let mut group = c.benchmark_group("flood_fill_full_rebuild");
	group.sample_size(20);
	let camera = camera();
	for (name, config) in [("smart", GraphConfig::DEFAULT), ("no_occlusion", GraphConfig::NO_OCCLUSION)] {
		let grid = loaded_grid(12);
		group.bench_function(name, |b| {
			b.iter(|| {
				let propagation = Propagation::new(&grid, &config, &camera);
				let mut storage = GraphStorage::new(&grid);
				let mut queue = propagation.seed_full_rebuild(&mut storage);
				black_box(propagation.run(&mut storage, &mut queue, |_| {}))
			})
		});
	}
	group.finish();
}

// ============================================================================
// Grid
// ============================================================================

fn bench_grid_reposition(c: &mut Criterion) {
	let grid = loaded_grid(16);
	let mut x = 0;
	c.bench_function("grid_reposition_one_column", |b| {
		b.iter(|| {
			x += 1;
			grid.reposition(SectionPos::new(x, 4, 0));
		})
	});
}

criterion_group!(
	benches,
	bench_octree_build,
	bench_octree_query,
	bench_full_rebuild,
	bench_grid_reposition
);
criterion_main!(benches);
