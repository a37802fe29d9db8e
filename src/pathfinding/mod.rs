//! Voxel pathfinding is a means of planning a route for a single agent through
//! a 3D world where obstacles occlude movement and climbing is expensive.
//!
//! [Amit Patel - Introduction to A*](https://www.redblobgames.com/pathfinding/a-star/introduction.html)
//!
//! [LaValle - Rapidly-exploring random trees](http://lavalle.pl/papers/Lav98c.pdf)
//!
//! The world is divided into a [VoxelGrid] of cubic cells. Every cell is a
//! [Voxel] which is either walkable or blocked and which links to the up to 26
//! voxels surrounding it. A planner consumes the grid alongside an
//! [ObstacleQuery] (used to test line of sight between two points) and
//! produces a sequence of world positions from a start to a target.
//!
//! Definitions:
//!
//! * Voxel - a unit cell of the grid with a fixed world position and walkability
//! * Combined cost - cost-so-far plus heuristic estimate, used to order the A* frontier
//! * Line-of-sight test - a straight segment collision query between two points
//! * Frontier - candidate voxels or partial paths not yet expanded
//! * Beam width - the number of partial paths beam search keeps between rounds
//! * Tree node - a voxel accepted into the RRT reachability tree, linked to its parent
//!
//! Four interchangeable planners implement [PathPlanner]:
//!
//! * [AStar] - informed search over the voxel graph with a binary heap frontier
//! * [HillClimbing] - greedy local search with a stochastic stuck counter
//! * [Rrt] - incremental random tree growth with nearest neighbour queries
//! * [BeamSearch] - breadth-wise expansion keeping only the best scoring paths
//!
//! A search never mutates the grid, each planner keeps its own exploration
//! records which are reset at the start of every call. Searching the same
//! planner instance from several threads at once is not supported.
//!

pub mod algorithms;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod planner;
pub mod settings;
pub mod telemetry;

use crate::prelude::*;
use bevy::prelude::*;

/// Selects one of the four planners
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Algorithm {
	/// Informed graph search
	#[default]
	AStar,
	/// Stochastic local search
	HillClimbing,
	/// Sampling based tree search
	Rrt,
	/// Bounded width beam search
	BeamSearch,
}

impl Algorithm {
	/// Every algorithm in declaration order
	pub const ALL: [Algorithm; 4] = [
		Algorithm::AStar,
		Algorithm::HillClimbing,
		Algorithm::Rrt,
		Algorithm::BeamSearch,
	];
}

impl std::fmt::Display for Algorithm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Algorithm::AStar => "AStar",
			Algorithm::HillClimbing => "HillClimbing",
			Algorithm::Rrt => "RRT",
			Algorithm::BeamSearch => "BeamSearch",
		};
		write!(f, "{}", name)
	}
}

/// Capability shared by every planner
pub trait PathPlanner {
	/// Which algorithm this planner implements
	fn algorithm(&self) -> Algorithm;
	/// Plan a route from `start` to `target`, both in world space. On success
	/// the first waypoint is the centre of the start voxel and the last the
	/// centre of the target voxel
	fn find_path(
		&mut self,
		space: &SearchSpace,
		start: Vec3,
		target: Vec3,
	) -> Result<Vec<Vec3>, PathfindingError>;
	/// Number of voxels the most recent search explored
	fn nodes_explored(&self) -> usize;
	/// Clear the exploration records of the most recent search
	fn reset(&mut self);
	/// Update a numeric parameter by name, flags treat any non-zero value as `true`
	fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError>;
}

/// The grid and obstacle layer a search runs against
#[derive(Clone, Copy)]
pub struct SearchSpace<'a> {
	/// Voxels of the world
	grid: &'a VoxelGrid,
	/// Geometry used for line of sight
	obstacles: &'a dyn ObstacleQuery,
}

impl<'a> SearchSpace<'a> {
	/// Create a new instance of [SearchSpace]
	pub fn new(grid: &'a VoxelGrid, obstacles: &'a dyn ObstacleQuery) -> Self {
		SearchSpace { grid, obstacles }
	}
	pub fn get_grid(&self) -> &'a VoxelGrid {
		self.grid
	}
	pub fn get_obstacles(&self) -> &'a dyn ObstacleQuery {
		self.obstacles
	}
	/// World-space centre of a voxel
	pub fn get_position(&self, id: VoxelId) -> Vec3 {
		self.grid.get_position(id)
	}
	/// Resolve the start and target positions to voxels, both must exist and be walkable
	pub fn resolve_endpoints(
		&self,
		start: Vec3,
		target: Vec3,
	) -> Result<(VoxelId, VoxelId), PathfindingError> {
		let start_id = self.grid.voxel_id_at(start);
		let target_id = self.grid.voxel_id_at(target);
		match (start_id, target_id) {
			(Some(s), Some(t)) => {
				if self.grid.is_walkable(s) && self.grid.is_walkable(t) {
					Ok((s, t))
				} else {
					warn!("Start or target voxel is not walkable");
					Err(PathfindingError::InvalidEndpoint { start, target })
				}
			}
			_ => {
				warn!("Start or target position is outside of the grid");
				Err(PathfindingError::InvalidEndpoint { start, target })
			}
		}
	}
	/// Whether the straight segment between the centres of two voxels is free of obstacles
	pub fn has_line_of_sight(&self, from: VoxelId, to: VoxelId) -> bool {
		self.is_segment_clear(self.get_position(from), self.get_position(to))
	}
	/// Whether the straight segment between two points is free of obstacles
	pub fn is_segment_clear(&self, from: Vec3, to: Vec3) -> bool {
		!self.obstacles.is_segment_blocked(from, to)
	}
	/// Whether a ray cast from `origin` along `direction` reaches `distance` without a hit
	pub fn is_ray_clear(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool {
		!self.obstacles.raycast(origin, direction, distance)
	}
	/// Convert a sequence of voxels into their world positions
	pub fn to_waypoints(&self, ids: &[VoxelId]) -> Vec<Vec3> {
		ids.iter().map(|id| self.get_position(*id)).collect()
	}
}

/// Parse a flag from a numeric parameter value
pub(crate) fn flag_from_value(value: f32) -> bool {
	value != 0.0
}

/// Convert a numeric parameter value to a count, negative values clamp to zero
pub(crate) fn count_from_value(value: f32) -> usize {
	value.max(0.0) as usize
}
