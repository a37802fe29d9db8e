//! Drive every planner through the same scenarios
//!

use bevy::prelude::*;
use bevy_voxel_pathfinding_plugin::prelude::*;

/// An empty 10x10x10 grid of unit voxels
fn open_world() -> (VoxelGrid, Obstacles) {
	let obstacles = Obstacles::new();
	let dimensions = GridDimensions::new(Vec3::splat(10.0), Vec3::ZERO, 1.0).unwrap();
	(VoxelGrid::new(dimensions, &obstacles), obstacles)
}

/// A 10x10x10 grid split in two by a solid wall at `x = 4`
fn walled_world() -> (VoxelGrid, Obstacles) {
	let mut obstacles = Obstacles::new();
	obstacles.add_box_from_corners(Vec3::new(4.0, -1.0, -1.0), Vec3::new(5.0, 11.0, 11.0));
	let dimensions = GridDimensions::new(Vec3::splat(10.0), Vec3::ZERO, 1.0).unwrap();
	(VoxelGrid::new(dimensions, &obstacles), obstacles)
}

/// One instance of every planner, the random ones seeded
fn planners() -> Vec<Box<dyn PathPlanner>> {
	vec![
		Box::new(AStar::new()),
		Box::new(HillClimbing::with_seed(17)),
		Box::new(Rrt::with_seed(17)),
		Box::new(BeamSearch::new()),
	]
}

#[test]
fn open_corridor_with_astar() {
	let (grid, obstacles) = open_world();
	let space = SearchSpace::new(&grid, &obstacles);
	let mut planner = AStar::new();
	let path = planner
		.find_path(&space, Vec3::splat(0.5), Vec3::new(9.5, 0.5, 0.5))
		.unwrap();
	assert_eq!(10, path.len());
	let metrics = PathMetrics::from_waypoints(&path);
	assert!((metrics.get_cost() - 9.0).abs() < 1e-4);
	assert!(planner.nodes_explored() <= 100);
}

#[test]
fn every_planner_crosses_open_world() {
	let (grid, obstacles) = open_world();
	let space = SearchSpace::new(&grid, &obstacles);
	let start = Vec3::new(0.5, 0.5, 0.5);
	let target = Vec3::new(8.5, 2.5, 7.5);
	for mut planner in planners() {
		let path = planner.find_path(&space, start, target).unwrap();
		assert_eq!(Vec3::new(0.5, 0.5, 0.5), path[0], "{}", planner.algorithm());
		assert_eq!(
			Vec3::new(8.5, 2.5, 7.5),
			*path.last().unwrap(),
			"{}",
			planner.algorithm()
		);
	}
}

#[test]
fn wall_blocks_every_planner() {
	let (grid, obstacles) = walled_world();
	let space = SearchSpace::new(&grid, &obstacles);
	for mut planner in planners() {
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::new(9.5, 0.5, 0.5));
		assert!(result.is_err(), "{} crossed the wall", planner.algorithm());
	}
}

#[test]
fn start_equals_target_for_every_planner() {
	let (grid, obstacles) = open_world();
	let space = SearchSpace::new(&grid, &obstacles);
	for mut planner in planners() {
		let result = planner
			.find_path(&space, Vec3::new(3.2, 4.9, 5.1), Vec3::new(3.8, 4.1, 5.7))
			.unwrap();
		assert_eq!(vec![Vec3::new(3.5, 4.5, 5.5)], result);
	}
}

#[test]
fn unwalkable_endpoints_explore_nothing() {
	let (grid, obstacles) = walled_world();
	let space = SearchSpace::new(&grid, &obstacles);
	for mut planner in planners() {
		// the target sits inside the wall
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::new(4.5, 0.5, 0.5));
		assert!(matches!(
			result,
			Err(PathfindingError::InvalidEndpoint { .. })
		));
		assert_eq!(0, planner.nodes_explored(), "{}", planner.algorithm());
		// the start lies outside the grid
		let result = planner.find_path(&space, Vec3::new(-3.0, 0.5, 0.5), Vec3::splat(0.5));
		assert!(matches!(
			result,
			Err(PathfindingError::InvalidEndpoint { .. })
		));
		assert_eq!(0, planner.nodes_explored(), "{}", planner.algorithm());
	}
}

#[test]
fn blocked_start_explores_nothing() {
	let (grid, obstacles) = walled_world();
	let space = SearchSpace::new(&grid, &obstacles);
	for mut planner in planners() {
		// a prior search leaves records behind
		planner
			.find_path(&space, Vec3::splat(0.5), Vec3::new(2.5, 0.5, 2.5))
			.unwrap();
		assert!(planner.nodes_explored() > 0, "{}", planner.algorithm());
		// the start sits inside the wall
		let result = planner.find_path(&space, Vec3::new(4.5, 0.5, 0.5), Vec3::new(8.5, 0.5, 0.5));
		let actual = matches!(result, Err(PathfindingError::InvalidEndpoint { .. }));
		assert!(actual, "{}", planner.algorithm());
		let result = planner.nodes_explored();
		let actual = 0;
		assert_eq!(actual, result, "{}", planner.algorithm());
	}
}

#[test]
fn zero_iterations_never_search() {
	let (grid, obstacles) = open_world();
	let space = SearchSpace::new(&grid, &obstacles);
	let mut beam = BeamSearch::new();
	beam.get_params_mut().max_iterations = 0;
	let mut rrt = Rrt::with_seed(3);
	rrt.get_params_mut().max_iterations = 0;
	let start = Vec3::splat(0.5);
	let target = Vec3::new(1.5, 0.5, 0.5);
	assert!(beam.find_path(&space, start, target).is_err());
	assert!(rrt.find_path(&space, start, target).is_err());
	assert_eq!(0, beam.nodes_explored());
}

#[test]
fn astar_matches_every_alternative_cost() {
	let (grid, obstacles) = open_world();
	let space = SearchSpace::new(&grid, &obstacles);
	let start = Vec3::new(0.5, 0.5, 0.5);
	let target = Vec3::new(6.5, 3.5, 2.5);
	let mut astar = AStar::new();
	let best = astar.find_path(&space, start, target).unwrap();
	let best_cost = route_cost(&best);
	// routes stepping between adjacent voxels can be no cheaper, RRT may jump
	// straight across open space so it is left out
	for mut planner in planners()
		.into_iter()
		.filter(|p| !matches!(p.algorithm(), Algorithm::AStar | Algorithm::Rrt))
	{
		if let Ok(path) = planner.find_path(&space, start, target) {
			assert!(best_cost <= route_cost(&path) + 1e-4);
		}
	}
}

/// Cost of a route under the default A* edge costs
fn route_cost(path: &[Vec3]) -> f32 {
	let multiplier = AStarParams::default().height_cost_multiplier;
	path.windows(2)
		.map(|w| w[0].distance(w[1]) + (w[1].y - w[0].y).abs() * multiplier)
		.sum()
}

#[test]
fn rrt_tree_has_no_cycles() {
	let (grid, obstacles) = walled_world();
	let space = SearchSpace::new(&grid, &obstacles);
	let mut rrt = Rrt::with_seed(8);
	let start = Vec3::splat(0.5);
	let _ = rrt.find_path(&space, start, Vec3::new(9.5, 0.5, 0.5));
	let root = grid.voxel_id_at(start).unwrap();
	let tree = rrt.get_tree();
	assert!(tree.len() > 1);
	for node in tree.iter() {
		let mut current = *node;
		let mut hops = 0;
		while current != root {
			current = rrt.get_parent(current).unwrap();
			hops += 1;
			assert!(hops <= tree.len());
		}
	}
}

#[test]
fn beam_width_bounds_frontier() {
	let (grid, obstacles) = walled_world();
	let space = SearchSpace::new(&grid, &obstacles);
	for width in [1, 3, 20] {
		let mut beam = BeamSearch::new();
		beam.get_params_mut().beam_width = width;
		let _ = beam.find_path(&space, Vec3::new(0.5, 5.5, 5.5), Vec3::new(9.5, 0.5, 0.5));
		assert!(beam.get_widest_beam() <= width);
	}
}

#[test]
fn planner_facade_records_every_request() {
	let (grid, obstacles) = walled_world();
	let mut planner = Planner::from_settings(&PlannerSettings {
		seed: Some(5),
		..Default::default()
	});
	let mut successes = 0;
	for algorithm in Algorithm::ALL {
		planner.set_algorithm(algorithm);
		// same side of the wall
		if planner
			.find_path(&grid, &obstacles, Vec3::splat(0.5), Vec3::new(3.5, 2.5, 3.5))
			.is_ok()
		{
			successes += 1;
		}
		let report = planner.get_last_report().unwrap();
		assert_eq!(algorithm, report.get_algorithm());
		assert_eq!(planner.nodes_explored(algorithm), report.get_nodes_explored());
	}
	assert!(successes >= 3);
}
