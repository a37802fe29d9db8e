//! Informed search over the voxel graph.
//!
//! Starting from the start voxel the frontier is expanded in order of
//! combined cost, the cost-so-far plus the straight line distance to the
//! target. Moving between two voxels costs their distance plus any climb
//! scaled by [AStarParams::height_cost_multiplier]:
//!
//! ```text
//!  cost = |b - a| + |b.y - a.y| * height_cost_multiplier
//! ```
//!
//! An edge is only considered when the climb stays within
//! [AStarParams::max_height_difference] and the segment between the two
//! voxel centres is free of obstacles.
//!
//! Per voxel bookkeeping lives in a [SearchRecord] arena indexed by
//! [VoxelId] and owned by the planner, the grid is never written to.
//!

use crate::pathfinding::flag_from_value;
use crate::prelude::*;
use bevy::prelude::*;

/// Number of expansions after which a search is abandoned
pub const ASTAR_MAX_ITERATIONS: usize = 40_000;
/// An edge is skipped when it would raise the cost-so-far above this
pub const ASTAR_MAX_PATH_COST: f32 = 1000.0;

/// Tunable values of [AStar]
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct AStarParams {
	/// Retained for configuration compatibility, edge costs are always the
	/// true distance so this has no effect
	pub diagonal_cost: f32,
	/// Scales the vertical component of a move when computing its cost
	pub height_cost_multiplier: f32,
	/// Retained for configuration compatibility, every voxel always links to
	/// all 26 surrounding voxels so this has no effect
	pub allow_diagonal: bool,
	/// Largest climb or drop allowed between two adjacent voxels
	pub max_height_difference: f32,
}

impl Default for AStarParams {
	fn default() -> Self {
		AStarParams {
			diagonal_cost: 1.4,
			height_cost_multiplier: 2.0,
			allow_diagonal: true,
			max_height_difference: 1.5,
		}
	}
}

impl AStarParams {
	/// Update a field by its name
	pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		match name {
			"diagonal_cost" => self.diagonal_cost = value,
			"height_cost_multiplier" => self.height_cost_multiplier = value,
			"allow_diagonal" => self.allow_diagonal = flag_from_value(value),
			"max_height_difference" => self.max_height_difference = value,
			_ => {
				return Err(ConfigError::UnknownParameter {
					algorithm: Algorithm::AStar,
					name: name.to_string(),
				})
			}
		}
		Ok(())
	}
}

/// Bookkeeping of a single voxel during a search
#[derive(Clone, Copy, Debug)]
pub struct SearchRecord {
	/// Cheapest known cost from the start
	cost_so_far: f32,
	/// Straight line distance to the target
	heuristic: f32,
	/// Voxel this one was reached from along the cheapest known route
	predecessor: Option<VoxelId>,
	/// Whether the voxel has been expanded
	closed: bool,
}

impl Default for SearchRecord {
	fn default() -> Self {
		SearchRecord {
			cost_so_far: f32::INFINITY,
			heuristic: f32::INFINITY,
			predecessor: None,
			closed: false,
		}
	}
}

impl SearchRecord {
	pub fn get_cost_so_far(&self) -> f32 {
		self.cost_so_far
	}
	pub fn get_heuristic(&self) -> f32 {
		self.heuristic
	}
	pub fn get_predecessor(&self) -> Option<VoxelId> {
		self.predecessor
	}
	pub fn is_closed(&self) -> bool {
		self.closed
	}
	/// Cost-so-far plus heuristic, the frontier ordering key
	pub fn get_combined_cost(&self) -> f32 {
		self.cost_so_far + self.heuristic
	}
}

/// Informed search planner
#[derive(Clone, Debug, Default)]
pub struct AStar {
	/// Tunable values
	params: AStarParams,
	/// Per voxel records of the most recent search, indexed by [VoxelId]
	records: Vec<SearchRecord>,
	/// Voxels waiting to be expanded
	open: VoxelHeap,
	/// Number of voxels expanded by the most recent search
	closed_count: usize,
}

impl AStar {
	/// Create a new instance of [AStar] with default parameters
	pub fn new() -> Self {
		AStar::default()
	}
	/// Create a new instance of [AStar] with custom parameters
	pub fn with_params(params: AStarParams) -> Self {
		AStar {
			params,
			..Default::default()
		}
	}
	pub fn get_params(&self) -> &AStarParams {
		&self.params
	}
	pub fn get_params_mut(&mut self) -> &mut AStarParams {
		&mut self.params
	}
	/// Record of a voxel from the most recent search
	pub fn get_record(&self, id: VoxelId) -> Option<&SearchRecord> {
		self.records.get(id.get())
	}
	/// Cost of moving between two adjacent positions
	fn movement_cost(&self, from: Vec3, to: Vec3) -> f32 {
		from.distance(to) + (to.y - from.y).abs() * self.params.height_cost_multiplier
	}
	/// Whether the edge from `current` into `neighbour` may be relaxed
	fn is_valid_neighbour(&self, space: &SearchSpace, current: VoxelId, neighbour: VoxelId) -> bool {
		if !space.get_grid().is_walkable(neighbour) || self.records[neighbour.get()].closed {
			return false;
		}
		let dy = (space.get_position(neighbour).y - space.get_position(current).y).abs();
		if dy > self.params.max_height_difference {
			return false;
		}
		space.has_line_of_sight(current, neighbour)
	}
	/// Walk the predecessor links from `target` back to `start`
	fn retrace_path(
		&self,
		space: &SearchSpace,
		start: VoxelId,
		target: VoxelId,
	) -> Result<Vec<Vec3>, PathfindingError> {
		let mut route = vec![target];
		let mut current = target;
		while current != start {
			// a valid chain can never be longer than the grid
			if route.len() > self.records.len() {
				error!("Predecessor chain loops, abandoning path");
				return Err(PathfindingError::PathReconstructionFailure);
			}
			match self.records[current.get()].predecessor {
				Some(previous) => {
					route.push(previous);
					current = previous;
				}
				None => {
					error!("Predecessor chain broken at {:?}", current);
					return Err(PathfindingError::PathReconstructionFailure);
				}
			}
		}
		route.reverse();
		Ok(space.to_waypoints(&route))
	}
}

impl PathPlanner for AStar {
	fn algorithm(&self) -> Algorithm {
		Algorithm::AStar
	}
	fn find_path(
		&mut self,
		space: &SearchSpace,
		start: Vec3,
		target: Vec3,
	) -> Result<Vec<Vec3>, PathfindingError> {
		self.reset();
		let (start_id, target_id) = space.resolve_endpoints(start, target)?;
		if start_id == target_id {
			return Ok(vec![space.get_position(start_id)]);
		}
		self.records
			.resize(space.get_grid().len(), SearchRecord::default());
		let target_position = space.get_position(target_id);
		let start_record = &mut self.records[start_id.get()];
		start_record.cost_so_far = 0.0;
		start_record.heuristic = space.get_position(start_id).distance(target_position);
		let key = start_record.get_combined_cost();
		self.open.insert(start_id, key);

		let mut iterations = 0;
		while let Some(current) = self.open.extract_min() {
			if current == target_id {
				return self.retrace_path(space, start_id, target_id);
			}
			iterations += 1;
			if iterations > ASTAR_MAX_ITERATIONS {
				warn!("A* exceeded {} iterations", ASTAR_MAX_ITERATIONS);
				return Err(PathfindingError::IterationLimitExceeded(
					ASTAR_MAX_ITERATIONS,
				));
			}
			self.records[current.get()].closed = true;
			self.closed_count += 1;

			let current_position = space.get_position(current);
			let current_cost = self.records[current.get()].cost_so_far;
			for &neighbour in space.get_grid().get_neighbours(current) {
				if !self.is_valid_neighbour(space, current, neighbour) {
					continue;
				}
				let neighbour_position = space.get_position(neighbour);
				let cost = current_cost + self.movement_cost(current_position, neighbour_position);
				if cost > ASTAR_MAX_PATH_COST {
					trace!("Skipping edge into {:?}, cost {} exceeds the limit", neighbour, cost);
					continue;
				}
				let queued = self.open.contains(neighbour);
				let record = &mut self.records[neighbour.get()];
				if cost < record.cost_so_far || !queued {
					record.cost_so_far = cost;
					record.heuristic = neighbour_position.distance(target_position);
					record.predecessor = Some(current);
					let key = record.get_combined_cost();
					if queued {
						self.open.decrease_key(neighbour, key);
					} else {
						self.open.insert(neighbour, key);
					}
				}
			}
		}
		debug!("A* exhausted the frontier after {} expansions", self.closed_count);
		Err(PathfindingError::NoPathFound)
	}
	fn nodes_explored(&self) -> usize {
		self.closed_count
	}
	fn reset(&mut self) {
		self.records.clear();
		self.open.clear();
		self.closed_count = 0;
	}
	fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		self.params.set_by_name(name, value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::{BinaryHeap, HashMap};

	/// An empty grid of `size` unit voxels along each axis
	fn open_grid(size: f32) -> VoxelGrid {
		let dimensions = GridDimensions::new(Vec3::splat(size), Vec3::ZERO, 1.0).unwrap();
		VoxelGrid::new(dimensions, &Obstacles::new())
	}
	/// Total movement cost of a route under default parameters
	fn route_cost(route: &[Vec3]) -> f32 {
		let planner = AStar::new();
		route
			.windows(2)
			.map(|w| planner.movement_cost(w[0], w[1]))
			.sum()
	}
	/// Cheapest cost between two voxels found by an exhaustive Dijkstra over
	/// walkable voxels using the same edge rules
	fn dijkstra_cost(grid: &VoxelGrid, start: VoxelId, target: VoxelId) -> f32 {
		/// Max-heap entry inverted to pop the smallest cost first
		#[derive(PartialEq)]
		struct Entry(f32, VoxelId);
		impl Eq for Entry {}
		impl PartialOrd for Entry {
			fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
				Some(self.cmp(other))
			}
		}
		impl Ord for Entry {
			fn cmp(&self, other: &Self) -> std::cmp::Ordering {
				other.0.total_cmp(&self.0)
			}
		}
		let planner = AStar::new();
		let mut best: HashMap<VoxelId, f32> = HashMap::new();
		let mut queue = BinaryHeap::new();
		best.insert(start, 0.0);
		queue.push(Entry(0.0, start));
		while let Some(Entry(cost, id)) = queue.pop() {
			if id == target {
				return cost;
			}
			if cost > *best.get(&id).unwrap_or(&f32::INFINITY) {
				continue;
			}
			for &n in grid.get_neighbours(id) {
				if !grid.is_walkable(n) {
					continue;
				}
				let next = cost + planner.movement_cost(grid.get_position(id), grid.get_position(n));
				if next < *best.get(&n).unwrap_or(&f32::INFINITY) {
					best.insert(n, next);
					queue.push(Entry(next, n));
				}
			}
		}
		f32::INFINITY
	}
	#[test]
	fn straight_corridor() {
		let grid = open_grid(10.0);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let path = planner
			.find_path(&space, Vec3::splat(0.5), Vec3::new(9.5, 0.5, 0.5))
			.unwrap();
		assert_eq!(10, path.len());
		assert!((route_cost(&path) - 9.0).abs() < 1e-4);
		assert!(planner.nodes_explored() <= 100);
	}
	#[test]
	fn diagonal_route_is_optimal() {
		let mut grid = open_grid(8.0);
		// a pillar forcing a detour
		for y in 0..8 {
			for z in 1..8 {
				let id = grid.voxel_id_at_coord(IVec3::new(4, y, z)).unwrap();
				grid.set_walkable(id, false);
			}
		}
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let start = Vec3::new(1.5, 2.5, 6.5);
		let target = Vec3::new(7.5, 3.5, 6.5);
		let mut planner = AStar::new();
		let path = planner.find_path(&space, start, target).unwrap();
		let result = route_cost(&path);
		let actual = dijkstra_cost(
			&grid,
			grid.voxel_id_at(start).unwrap(),
			grid.voxel_id_at(target).unwrap(),
		);
		assert!((actual - result).abs() < 1e-3);
	}
	#[test]
	fn waypoints_are_adjacent_and_unique() {
		let grid = open_grid(10.0);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let path = planner
			.find_path(&space, Vec3::new(0.5, 0.5, 9.5), Vec3::new(9.5, 3.5, 0.5))
			.unwrap();
		let ids: Vec<VoxelId> = path.iter().map(|p| grid.voxel_id_at(*p).unwrap()).collect();
		for pair in ids.windows(2) {
			assert!(grid.get_neighbours(pair[0]).contains(&pair[1]));
		}
		let mut unique = ids.clone();
		unique.sort();
		unique.dedup();
		assert_eq!(ids.len(), unique.len());
	}
	#[test]
	fn climbs_respect_height_limit() {
		let grid = open_grid(6.0);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		planner.get_params_mut().max_height_difference = 0.5;
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::new(0.5, 3.5, 0.5));
		assert_eq!(Err(PathfindingError::NoPathFound), result);
	}
	#[test]
	fn wall_blocks_search() {
		let mut obstacles = Obstacles::new();
		obstacles.add_box_from_corners(Vec3::new(4.0, -1.0, -1.0), Vec3::new(5.0, 11.0, 11.0));
		let dimensions = GridDimensions::new(Vec3::splat(10.0), Vec3::ZERO, 1.0).unwrap();
		let grid = VoxelGrid::new(dimensions, &obstacles);
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::new(9.5, 0.5, 0.5));
		assert_eq!(Err(PathfindingError::NoPathFound), result);
		// every voxel on the start side of the wall was expanded
		assert_eq!(400, planner.nodes_explored());
	}
	#[test]
	fn iteration_cap() {
		let mut grid = open_grid(35.0);
		let target = grid.voxel_id_at_coord(IVec3::splat(34)).unwrap();
		let neighbours = grid.get_neighbours(target).to_vec();
		for n in neighbours {
			grid.set_walkable(n, false);
		}
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::splat(34.5));
		assert_eq!(
			Err(PathfindingError::IterationLimitExceeded(ASTAR_MAX_ITERATIONS)),
			result
		);
		assert_eq!(ASTAR_MAX_ITERATIONS, planner.nodes_explored());
	}
	#[test]
	fn blocked_target_explores_nothing() {
		let mut grid = open_grid(5.0);
		let id = grid.voxel_id_at_coord(IVec3::new(4, 0, 0)).unwrap();
		grid.set_walkable(id, false);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let result = planner.find_path(&space, Vec3::splat(0.5), Vec3::new(4.5, 0.5, 0.5));
		assert!(matches!(result, Err(PathfindingError::InvalidEndpoint { .. })));
		assert_eq!(0, planner.nodes_explored());
	}
	#[test]
	fn start_equals_target() {
		let grid = open_grid(5.0);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		let result = planner
			.find_path(&space, Vec3::new(2.2, 2.7, 2.1), Vec3::new(2.9, 2.3, 2.5))
			.unwrap();
		let actual = vec![Vec3::splat(2.5)];
		assert_eq!(actual, result);
	}
	#[test]
	fn records_reset_between_calls() {
		let grid = open_grid(5.0);
		let obstacles = Obstacles::new();
		let space = SearchSpace::new(&grid, &obstacles);
		let mut planner = AStar::new();
		planner
			.find_path(&space, Vec3::splat(0.5), Vec3::splat(4.5))
			.unwrap();
		assert!(planner.nodes_explored() > 0);
		planner.reset();
		assert_eq!(0, planner.nodes_explored());
		assert!(planner.get_record(VoxelId::new(0)).is_none());
	}
	#[test]
	fn unknown_parameter() {
		let mut planner = AStar::new();
		assert!(planner.set_parameter("height_cost_multiplier", 3.0).is_ok());
		assert_eq!(3.0, planner.get_params().height_cost_multiplier);
		assert!(planner.set_parameter("allow_diagonal", 0.0).is_ok());
		assert!(!planner.get_params().allow_diagonal);
		let result = planner.set_parameter("step_size", 1.0);
		assert!(matches!(
			result,
			Err(ConfigError::UnknownParameter { .. })
		));
	}
}
