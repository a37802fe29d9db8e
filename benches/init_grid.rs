//! Measure voxelising a world - every voxel is probed against the obstacles
//! and linked to its neighbours
//!
//! World is 100 by 20 by 100 with a field of pillars
//!

use bevy::prelude::*;
use bevy_voxel_pathfinding_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A grid of pillars spaced 10 apart
fn pillars() -> Obstacles {
	let mut obstacles = Obstacles::new();
	for x in 0..10 {
		for z in 0..10 {
			let centre = Vec3::new(x as f32 * 10.0 + 5.0, 10.0, z as f32 * 10.0 + 5.0);
			obstacles.add_box(centre, Vec3::new(1.0, 10.0, 1.0));
		}
	}
	obstacles
}

/// Build a grid
fn init_grid(world_size: Vec3, cell_size: f32, obstacles: &Obstacles) {
	let dimensions = GridDimensions::new(world_size, Vec3::ZERO, cell_size).unwrap();
	let _ = VoxelGrid::new(dimensions, obstacles);
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("data_initialisation");
	group.significance_level(0.1).sample_size(10);
	let obstacles = pillars();
	group.bench_function("init_grid", |b| {
		b.iter(|| {
			init_grid(
				black_box(Vec3::new(100.0, 20.0, 100.0)),
				black_box(1.0),
				black_box(&obstacles),
			)
		})
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
