//! Measure beam search finding its way over a wall with a gap near the top
//!
//! World is 30 by 10 by 30
//!

use bevy::prelude::*;
use bevy_voxel_pathfinding_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Build a grid split by a wall that stops short of the ceiling
fn prepare_grid() -> (VoxelGrid, Obstacles) {
	let mut obstacles = Obstacles::new();
	obstacles.add_box_from_corners(Vec3::new(14.0, -1.0, -1.0), Vec3::new(16.0, 7.0, 31.0));
	let dimensions = GridDimensions::new(Vec3::new(30.0, 10.0, 30.0), Vec3::ZERO, 1.0).unwrap();
	(VoxelGrid::new(dimensions, &obstacles), obstacles)
}

/// Plan from one side of the wall to the other
fn calc(planner: &mut BeamSearch, grid: &VoxelGrid, obstacles: &Obstacles) {
	let space = SearchSpace::new(grid, obstacles);
	let _ = planner.find_path(&space, Vec3::new(2.5, 0.5, 15.5), Vec3::new(27.5, 0.5, 15.5));
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(50);
	let (grid, obstacles) = prepare_grid();
	let mut planner = BeamSearch::new();
	group.bench_function("calc_beam_wall", |b| {
		b.iter(|| calc(&mut planner, black_box(&grid), black_box(&obstacles)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
